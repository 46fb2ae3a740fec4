//! Rolling population statistics.
//!
//! The world samples a [`StatsSample`] every `sample_interval` ticks. The
//! [`StatsSeries`] keeps the most recent `window` samples and evicts the
//! oldest first.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use vivarium_organisms::Organism;
use vivarium_types::CellKind;

use crate::LedgerError;

/// Default number of samples retained.
pub const DEFAULT_RECORD_WINDOW: usize = 500;

/// Population statistics at one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSample {
    /// Tick the sample was taken.
    pub tick: u64,
    /// Living organisms.
    pub population: u32,
    /// Extant species.
    pub species_count: u32,
    /// Mean mutability across living organisms.
    pub average_mutability: f64,
    /// Mean cell count across living organisms.
    pub average_cell_count: f64,
    /// Mean count of each living kind per organism.
    pub average_kind_counts: BTreeMap<CellKind, f64>,
}

impl StatsSample {
    /// Summarize the given living organisms.
    pub fn collect<'a, I>(tick: u64, organisms: I, species_count: u32) -> Self
    where
        I: IntoIterator<Item = &'a Organism>,
    {
        let mut population = 0_u32;
        let mut mutability = 0_u64;
        let mut cells = 0_u64;
        let mut kinds: BTreeMap<CellKind, u64> = BTreeMap::new();
        for org in organisms {
            population = population.saturating_add(1);
            mutability = mutability.saturating_add(u64::from(org.mutability));
            cells = cells.saturating_add(u64::from(org.anatomy.cell_count()));
            for kind in CellKind::LIVING {
                let slot = kinds.entry(kind).or_insert(0);
                *slot = slot.saturating_add(u64::from(org.anatomy.count(kind)));
            }
        }
        let mean = |total: u64| {
            if population == 0 {
                0.0
            } else {
                total as f64 / f64::from(population)
            }
        };
        Self {
            tick,
            population,
            species_count,
            average_mutability: mean(mutability),
            average_cell_count: mean(cells),
            average_kind_counts: kinds.into_iter().map(|(k, n)| (k, mean(n))).collect(),
        }
    }
}

/// A bounded FIFO of samples.
///
/// Deserialization rejects a zero window and drops the oldest samples
/// beyond the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRecord")]
pub struct StatsSeries {
    window: usize,
    samples: VecDeque<StatsSample>,
}

/// Wire form of [`StatsSeries`], validated on the way in.
#[derive(Deserialize)]
struct SeriesRecord {
    window: usize,
    #[serde(default)]
    samples: VecDeque<StatsSample>,
}

impl TryFrom<SeriesRecord> for StatsSeries {
    type Error = LedgerError;

    fn try_from(record: SeriesRecord) -> Result<Self, Self::Error> {
        if record.window == 0 {
            return Err(LedgerError::EmptyWindow);
        }
        let mut samples = record.samples;
        let excess = samples.len().saturating_sub(record.window);
        samples.drain(..excess);
        Ok(Self {
            window: record.window,
            samples,
        })
    }
}

impl Default for StatsSeries {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_WINDOW)
    }
}

impl StatsSeries {
    /// Create an empty series retaining at most `window` samples (minimum 1).
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            samples: VecDeque::new(),
        }
    }

    /// Append a sample, evicting the oldest when the window is full.
    pub fn push(&mut self, sample: StatsSample) {
        while self.samples.len() >= self.window.max(1) {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Samples from oldest to newest.
    pub fn samples(&self) -> impl Iterator<Item = &StatsSample> {
        self.samples.iter()
    }

    /// The newest sample.
    pub fn latest(&self) -> Option<&StatsSample> {
        self.samples.back()
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum samples retained.
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
