//! Simulation loop runner with operator controls.
//!
//! [`run_simulation`] is the top-level async function that drives the tick
//! loop with support for:
//!
//! - **Bounded runs**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Stop/start**: the operator can park and resume the loop losslessly
//! - **Variable tick speed**: tick interval adjustable at runtime
//! - **Queued commands**: applied between ticks, never during one
//! - **Extinction pause**: ends the run when the policy says so
//!
//! The runner only decides when to call [`WorldSimulation::step`]; the
//! world itself is owned by the caller and never shared across tasks.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ExtinctionPolicy;
use crate::operator::{OperatorCommand, OperatorState, SimulationEndReason};
use crate::tick::{TickError, TickSummary, WorldSimulation};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the run ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Number of ticks executed by this run.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to publish summaries, take periodic
/// saves, or feed a renderer from the world state.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, world: &WorldSimulation);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _world: &WorldSimulation) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub async fn run_simulation(
    world: &mut WorldSimulation,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        // --- Park while stopped ---
        if !operator.is_running() && !operator.is_shutdown_requested() {
            info!(tick = world.tick(), "Simulation stopped, waiting for start...");
            operator.wait_until_running().await;
            info!(tick = world.tick(), "Simulation started");
        }

        // --- Check shutdown (before tick) ---
        if operator.is_shutdown_requested() {
            info!("Operator shutdown requested");
            return finish(operator, SimulationEndReason::OperatorShutdown, last_summary, total_ticks)
                .await;
        }

        // --- Check time limit (before tick) ---
        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            return finish(operator, SimulationEndReason::MaxRealTimeReached, last_summary, total_ticks)
                .await;
        }

        // --- Apply queued commands ---
        for command in operator.drain_commands().await {
            apply_command(world, command);
        }

        // --- Execute tick ---
        let summary = world.step()?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, world);

        // --- Check extinction ---
        if summary.extinct && world.config().world.extinction_policy == ExtinctionPolicy::Pause {
            operator.stop();
            info!(tick = summary.tick, "All organisms dead -- extinction");
            return finish(operator, SimulationEndReason::Extinction, Some(summary), total_ticks)
                .await;
        }

        // --- Check tick limit (after tick) ---
        if operator.tick_limit_reached(total_ticks) {
            info!(
                total_ticks,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            return finish(operator, SimulationEndReason::MaxTicksReached, Some(summary), total_ticks)
                .await;
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

async fn finish(
    operator: &OperatorState,
    end_reason: SimulationEndReason,
    final_summary: Option<TickSummary>,
    total_ticks: u64,
) -> Result<SimulationResult, RunnerError> {
    operator.set_end_reason(end_reason).await;
    Ok(SimulationResult {
        end_reason,
        final_summary,
        total_ticks,
    })
}

/// Apply one operator command to the world.
pub fn apply_command(world: &mut WorldSimulation, command: OperatorCommand) {
    debug!(?command, "applying operator command");
    match command {
        OperatorCommand::Reset { seed } => world.reset(seed),
        OperatorCommand::ApplyConfig { engine } => {
            // Rejections are logged by the world; the old snapshot stays.
            let _ = world.apply_config(engine);
        }
        OperatorCommand::Inject { plan, col, row } => {
            if world.inject_organism(&plan, col, row).is_none() {
                warn!(col, row, "operator injection blocked");
            }
        }
        OperatorCommand::PlaceWall { col, row } => {
            world.place_wall(col, row);
        }
        OperatorCommand::ClearWalls => {
            world.clear_walls();
        }
        OperatorCommand::ClearFood => {
            world.clear_food();
        }
        OperatorCommand::KillAll => {
            world.kill_all();
        }
    }
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_population = result.final_summary.as_ref().map(|s| s.population),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            population = summary.population,
            species = summary.species_count,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vivarium_organisms::GrowthPlan;
    use vivarium_types::CellKind;

    use super::*;
    use crate::config::{SimulationBoundsConfig, SimulationConfig};

    fn world(policy: ExtinctionPolicy) -> WorldSimulation {
        let mut config = SimulationConfig::default();
        config.world.cols = 24;
        config.world.rows = 24;
        config.world.extinction_policy = policy;
        let mut world = WorldSimulation::headless(config).unwrap();
        world.reset(1);
        world
    }

    fn operator(max_ticks: u64) -> Arc<OperatorState> {
        let bounds = SimulationBoundsConfig {
            max_ticks,
            max_real_time_seconds: 0,
        };
        Arc::new(OperatorState::new(0, &bounds))
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut world = world(ExtinctionPolicy::Reset);
        let operator = operator(5);
        let result = run_simulation(&mut world, &operator, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(world.tick(), 5);
        assert_eq!(
            operator.end_reason().await,
            Some(SimulationEndReason::MaxTicksReached)
        );
    }

    #[tokio::test]
    async fn operator_shutdown() {
        let mut world = world(ExtinctionPolicy::Reset);
        let operator = operator(0);
        operator.request_shutdown();
        let result = run_simulation(&mut world, &operator, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::OperatorShutdown);
        assert_eq!(result.total_ticks, 0);
    }

    #[tokio::test]
    async fn extinction_pause_ends_run() {
        let mut world = world(ExtinctionPolicy::Pause);
        let operator = operator(0);
        operator.queue_command(OperatorCommand::KillAll).await;
        operator
            .queue_command(OperatorCommand::Inject {
                plan: GrowthPlan::single(CellKind::Killer),
                col: 2,
                row: 2,
            })
            .await;
        operator
            .queue_command(OperatorCommand::Inject {
                plan: GrowthPlan::single(CellKind::Killer),
                col: 3,
                row: 2,
            })
            .await;
        let mut engine = world.config().engine.clone();
        engine.insta_kill = true;
        operator
            .queue_command(OperatorCommand::ApplyConfig { engine })
            .await;

        let result = run_simulation(&mut world, &operator, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::Extinction);
        assert_eq!(result.total_ticks, 1);
        assert!(!operator.is_running());
    }

    #[tokio::test]
    async fn tick_callback_is_called() {
        struct CountCallback {
            count: u64,
        }
        impl TickCallback for CountCallback {
            fn on_tick(&mut self, _summary: &TickSummary, _world: &WorldSimulation) {
                self.count = self.count.saturating_add(1);
            }
        }

        let mut world = world(ExtinctionPolicy::Reset);
        let operator = operator(3);
        let mut cb = CountCallback { count: 0 };
        run_simulation(&mut world, &operator, &mut cb).await.unwrap();
        assert_eq!(cb.count, 3);
    }

    #[tokio::test]
    async fn stopped_loop_resumes_on_start() {
        let mut world = world(ExtinctionPolicy::Reset);
        let operator = operator(2);
        operator.stop();

        let remote = Arc::clone(&operator);
        let starter = tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
            remote.start();
        });

        let result = run_simulation(&mut world, &operator, &mut NoOpCallback)
            .await
            .unwrap();
        starter.await.unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 2);
    }

    #[test]
    fn commands_reach_the_world() {
        let mut world = world(ExtinctionPolicy::Continue);
        apply_command(&mut world, OperatorCommand::PlaceWall { col: 0, row: 0 });
        assert_eq!(
            world.grid().kind_at(vivarium_types::Offset::ORIGIN),
            Some(CellKind::Wall)
        );
        apply_command(&mut world, OperatorCommand::ClearWalls);
        assert_eq!(world.grid().count_of(CellKind::Wall), 0);
        apply_command(&mut world, OperatorCommand::Reset { seed: 5 });
        assert_eq!(world.status().reset_count, 2);
        assert_eq!(world.config().world.seed, 5);
    }
}
