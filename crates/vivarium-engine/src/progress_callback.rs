//! Tick callback that reports simulation progress through tracing.
//!
//! Every `interval` ticks the callback logs a one-line summary of the
//! world: population, species, food on the grid and the cumulative births
//! and deaths since the previous report. Resets and extinctions are always
//! logged, regardless of the interval.

use tracing::{debug, info};
use vivarium_core::{TickCallback, TickSummary, WorldSimulation};
use vivarium_types::CellKind;

/// Callback that turns tick summaries into periodic progress logs.
#[derive(Debug)]
pub struct ProgressCallback {
    interval: u64,
    births: u64,
    deaths: u64,
    reports: u64,
}

impl ProgressCallback {
    /// Report every `interval` ticks; zero disables periodic reports.
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            births: 0,
            deaths: 0,
            reports: 0,
        }
    }

    /// Number of periodic reports emitted so far.
    pub const fn reports(&self) -> u64 {
        self.reports
    }

    fn due(&self, tick: u64) -> bool {
        self.interval > 0 && tick > 0 && tick.checked_rem(self.interval) == Some(0)
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, world: &WorldSimulation) {
        self.births = self.births.saturating_add(u64::from(summary.births));
        self.deaths = self.deaths.saturating_add(u64::from(summary.deaths));

        if summary.reset {
            info!(
                tick = summary.tick,
                resets = world.status().reset_count,
                "World reset after extinction"
            );
        } else if summary.extinct {
            info!(tick = summary.tick, "Population extinct");
        }

        if !self.due(summary.tick) {
            debug!(
                tick = summary.tick,
                population = summary.population,
                births = summary.births,
                deaths = summary.deaths,
                "Tick complete"
            );
            return;
        }

        info!(
            tick = summary.tick,
            population = summary.population,
            species = summary.species_count,
            extinct_species = world.fossil_record().extinct_count(),
            food = world.grid().count_of(CellKind::Food),
            births = self.births,
            deaths = self.deaths,
            "Progress"
        );
        self.births = 0;
        self.deaths = 0;
        self.reports = self.reports.saturating_add(1);
    }
}
