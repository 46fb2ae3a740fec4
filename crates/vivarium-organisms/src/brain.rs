//! Decision policy mapping observed cell kinds to reactions.
//!
//! A [`BrainPolicy`] holds one [`Decision`] per [`CellKind`]. After the
//! cell pass of each tick, the organism hands its observation buffer to
//! [`BrainPolicy::decide`]; the closest observation picks the reaction.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use vivarium_types::{CellKind, Decision, Direction, Observation, OrganismId};

/// Kinds whose decisions are always redrawn by [`BrainPolicy::randomize_decisions`].
const NARROW_KINDS: [CellKind; 5] = [
    CellKind::Mouth,
    CellKind::Producer,
    CellKind::Mover,
    CellKind::Armor,
    CellKind::Eye,
];

/// Kinds additionally redrawn when randomizing everything.
const WIDE_KINDS: [CellKind; 3] = [CellKind::Food, CellKind::Killer, CellKind::Brain];

/// One reaction per cell kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrainPolicy {
    decisions: [Decision; 10],
}

impl Default for BrainPolicy {
    /// Chase food, retreat from killers, ignore everything else.
    fn default() -> Self {
        let mut policy = Self {
            decisions: [Decision::Neutral; 10],
        };
        policy.set(CellKind::Food, Decision::Chase);
        policy.set(CellKind::Killer, Decision::Retreat);
        policy
    }
}

impl BrainPolicy {
    /// The reaction to `kind`.
    pub fn decision(&self, kind: CellKind) -> Decision {
        self.decisions.get(kind.index()).copied().unwrap_or_default()
    }

    /// Set the reaction to `kind`.
    pub fn set(&mut self, kind: CellKind, decision: Decision) {
        if let Some(slot) = self.decisions.get_mut(kind.index()) {
            *slot = decision;
        }
    }

    /// Redraw reactions for body-cell kinds; with `all`, also for food,
    /// killers and brains.
    pub fn randomize_decisions<R: Rng + ?Sized>(&mut self, all: bool, rng: &mut R) {
        for kind in NARROW_KINDS {
            self.set(kind, random_decision(rng));
        }
        if all {
            for kind in WIDE_KINDS {
                self.set(kind, random_decision(rng));
            }
        }
    }

    /// Redraw one random kind's reaction. Empty always stays neutral.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(kind) = CellKind::ALL.choose(rng).copied() {
            self.set(kind, random_decision(rng));
        }
        self.set(CellKind::Empty, Decision::Neutral);
    }

    /// Pick a new heading from this tick's observations.
    ///
    /// Observations of `self_id`'s own cells are ignored. The closest
    /// remaining observation decides; on a tie the earliest wins. Returns
    /// `None` when the heading should stay as it is.
    pub fn decide(&self, observations: &[Observation], self_id: OrganismId) -> Option<Direction> {
        let mut closest: Option<&Observation> = None;
        for obs in observations {
            if obs.owner == Some(self_id) {
                continue;
            }
            if closest.is_none_or(|best| obs.distance < best.distance) {
                closest = Some(obs);
            }
        }
        let obs = closest?;
        match self.decision(obs.target) {
            Decision::Neutral => None,
            Decision::Chase => Some(obs.direction),
            Decision::Retreat => Some(obs.direction.opposite()),
        }
    }
}

fn random_decision<R: Rng + ?Sized>(rng: &mut R) -> Decision {
    Decision::ALL.choose(rng).copied().unwrap_or_default()
}
