//! Enumeration types for the Vivarium simulation.
//!
//! The cell-kind set is closed: every kind that can ever appear on the grid
//! or inside an anatomy is a variant of [`CellKind`], and there is no
//! runtime registration.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell kinds
// ---------------------------------------------------------------------------

/// The kind of a grid cell or a body cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Nothing here.
    #[default]
    Empty,
    /// Free-standing food, eaten by mouths.
    Food,
    /// Impassable terrain.
    Wall,
    /// Eats adjacent food.
    Mouth,
    /// Passive; marks an organism as able to act on observations.
    Brain,
    /// Occasionally grows food next to itself.
    Producer,
    /// Contributes to movement eligibility and raises food cost.
    Mover,
    /// Harms adjacent cells of other organisms.
    #[serde(alias = "stinger")]
    Killer,
    /// Immune to killer cells.
    Armor,
    /// Casts a ray and records what it sees.
    Eye,
}

impl CellKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Empty,
        Self::Food,
        Self::Wall,
        Self::Mouth,
        Self::Brain,
        Self::Producer,
        Self::Mover,
        Self::Killer,
        Self::Armor,
        Self::Eye,
    ];

    /// The kinds that may appear in a live anatomy.
    pub const LIVING: [Self; 7] = [
        Self::Mouth,
        Self::Producer,
        Self::Mover,
        Self::Killer,
        Self::Armor,
        Self::Eye,
        Self::Brain,
    ];

    /// Stable lowercase name used by the persistence format.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Food => "food",
            Self::Wall => "wall",
            Self::Mouth => "mouth",
            Self::Brain => "brain",
            Self::Producer => "producer",
            Self::Mover => "mover",
            Self::Killer => "killer",
            Self::Armor => "armor",
            Self::Eye => "eye",
        }
    }

    /// Position of this kind in [`CellKind::ALL`]; used for dense per-kind tables.
    pub const fn index(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Food => 1,
            Self::Wall => 2,
            Self::Mouth => 3,
            Self::Brain => 4,
            Self::Producer => 5,
            Self::Mover => 6,
            Self::Killer => 7,
            Self::Armor => 8,
            Self::Eye => 9,
        }
    }

    /// Whether this kind may be part of an organism's body.
    pub const fn is_living(self) -> bool {
        !matches!(self, Self::Empty | Self::Food | Self::Wall)
    }
}

impl core::fmt::Display for CellKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A cell-kind name that does not match any known kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cell kind: {0:?}")]
pub struct UnknownCellKind(pub String);

impl FromStr for CellKind {
    type Err = UnknownCellKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(Self::Empty),
            "food" => Ok(Self::Food),
            "wall" => Ok(Self::Wall),
            "mouth" => Ok(Self::Mouth),
            "brain" => Ok(Self::Brain),
            "producer" => Ok(Self::Producer),
            "mover" => Ok(Self::Mover),
            "killer" | "stinger" => Ok(Self::Killer),
            "armor" => Ok(Self::Armor),
            "eye" => Ok(Self::Eye),
            other => Err(UnknownCellKind(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Brain decisions
// ---------------------------------------------------------------------------

/// How an organism responds to the closest thing it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Keep the current heading.
    #[default]
    Neutral,
    /// Turn toward the observation.
    Chase,
    /// Turn away from the observation.
    Retreat,
}

impl Decision {
    /// Every decision, used for uniform random draws.
    pub const ALL: [Self; 3] = [Self::Neutral, Self::Chase, Self::Retreat];
}

// ---------------------------------------------------------------------------
// Environment tag
// ---------------------------------------------------------------------------

/// Which environment an organism belongs to.
///
/// Editor organisms are authored off-grid by an external editor and are
/// never ticked by the world simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Placed in and ticked by the live world.
    #[default]
    World,
    /// Held by an editor; never ticked.
    Editor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip_through_from_str() {
        for kind in CellKind::ALL {
            assert_eq!(kind.name().parse::<CellKind>(), Ok(kind));
        }
    }

    #[test]
    fn stinger_is_an_alias_for_killer() {
        assert_eq!("stinger".parse::<CellKind>(), Ok(CellKind::Killer));
        let kind: CellKind = serde_json::from_str("\"stinger\"").unwrap_or_default();
        assert_eq!(kind, CellKind::Killer);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "tentacle".parse::<CellKind>();
        assert_eq!(err, Err(UnknownCellKind("tentacle".to_owned())));
    }

    #[test]
    fn living_set_excludes_terrain() {
        for kind in CellKind::LIVING {
            assert!(kind.is_living());
        }
        assert!(!CellKind::Empty.is_living());
        assert!(!CellKind::Food.is_living());
        assert!(!CellKind::Wall.is_living());
        assert_eq!(
            CellKind::ALL.iter().filter(|k| k.is_living()).count(),
            CellKind::LIVING.len()
        );
    }

    #[test]
    fn indices_are_dense() {
        for (i, kind) in CellKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
