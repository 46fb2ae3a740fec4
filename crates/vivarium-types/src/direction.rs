//! Compass directions, grid offsets, and rotation.
//!
//! The grid uses screen coordinates: `x` grows to the east and `y` grows
//! to the south. A [`Direction`] is one of the eight compass points and is
//! used at full precision for eye look directions and organism headings.
//!
//! Anatomy rotation is coarser. Body-local offsets only ever face four
//! effective orientations, so a body orientation is collapsed into a
//! [`BodyFacing`] bucket before offsets are rotated:
//!
//! | Body orientation | Bucket | Transform |
//! |------------------|--------|-----------|
//! | N | [`BodyFacing::North`] | `(x, y)` |
//! | NE, E, SE | [`BodyFacing::East`] | `(-y, x)` |
//! | S | [`BodyFacing::South`] | `(-x, -y)` |
//! | SW, W, NW | [`BodyFacing::West`] | `(y, -x)` |

use serde::{Deserialize, Serialize};

/// An integer offset pair on the grid, or a position relative to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Offset {
    /// Column delta (east positive).
    pub x: i32,
    /// Row delta (south positive).
    pub y: i32,
}

impl Offset {
    /// The anchor offset `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new offset.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise saturating addition.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }

    /// Multiply both components by `factor`, saturating on overflow.
    #[must_use]
    pub const fn scale(self, factor: i32) -> Self {
        Self {
            x: self.x.saturating_mul(factor),
            y: self.y.saturating_mul(factor),
        }
    }

    /// Step `steps` cells along `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction, steps: i32) -> Self {
        self.add(direction.offset().scale(steps))
    }

    /// Chebyshev length: the larger of `|x|` and `|y|`.
    pub const fn chebyshev(self) -> u32 {
        let ax = self.x.unsigned_abs();
        let ay = self.y.unsigned_abs();
        if ax > ay { ax } else { ay }
    }

    /// Manhattan distance between two offsets.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }

    /// Whether this is the anchor offset.
    pub const fn is_origin(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl From<(i32, i32)> for Offset {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Offset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Up (negative y).
    #[default]
    North,
    /// Up and right.
    NorthEast,
    /// Right (positive x).
    East,
    /// Down and right.
    SouthEast,
    /// Down (positive y).
    South,
    /// Down and left.
    SouthWest,
    /// Left (negative x).
    West,
    /// Up and left.
    NorthWest,
}

impl Direction {
    /// All eight directions in clockwise order starting at north.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// The four cardinal directions in clockwise order starting at north.
    pub const CARDINAL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Position of this direction in [`Direction::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::NorthEast => 1,
            Self::East => 2,
            Self::SouthEast => 3,
            Self::South => 4,
            Self::SouthWest => 5,
            Self::West => 6,
            Self::NorthWest => 7,
        }
    }

    /// Direction at `index` in [`Direction::ALL`], wrapping modulo 8.
    pub const fn from_index(index: usize) -> Self {
        match index % 8 {
            0 => Self::North,
            1 => Self::NorthEast,
            2 => Self::East,
            3 => Self::SouthEast,
            4 => Self::South,
            5 => Self::SouthWest,
            6 => Self::West,
            _ => Self::NorthWest,
        }
    }

    /// Unit grid offset for one step in this direction.
    pub const fn offset(self) -> Offset {
        match self {
            Self::North => Offset::new(0, -1),
            Self::NorthEast => Offset::new(1, -1),
            Self::East => Offset::new(1, 0),
            Self::SouthEast => Offset::new(1, 1),
            Self::South => Offset::new(0, 1),
            Self::SouthWest => Offset::new(-1, 1),
            Self::West => Offset::new(-1, 0),
            Self::NorthWest => Offset::new(-1, -1),
        }
    }

    /// Rotate 45 degrees clockwise.
    #[must_use]
    pub const fn rotate_right(self) -> Self {
        Self::from_index(self.index().wrapping_add(1))
    }

    /// Rotate 45 degrees counter-clockwise.
    #[must_use]
    pub const fn rotate_left(self) -> Self {
        Self::from_index(self.index().wrapping_add(7))
    }

    /// The direction pointing the other way. Involutive.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index().wrapping_add(4))
    }

    /// Compose a body-relative direction with an orientation.
    ///
    /// North is the identity orientation, so `d.rotated_by(North) == d`.
    #[must_use]
    pub const fn rotated_by(self, orientation: Self) -> Self {
        Self::from_index(self.index().wrapping_add(orientation.index()))
    }

    /// Collapse this orientation into its anatomy rotation bucket.
    pub const fn facing(self) -> BodyFacing {
        match self {
            Self::North => BodyFacing::North,
            Self::NorthEast | Self::East | Self::SouthEast => BodyFacing::East,
            Self::South => BodyFacing::South,
            Self::SouthWest | Self::West | Self::NorthWest => BodyFacing::West,
        }
    }

    /// Whether this is one of N, E, S, W.
    pub const fn is_cardinal(self) -> bool {
        matches!(self, Self::North | Self::East | Self::South | Self::West)
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::NorthEast => "north_east",
            Self::East => "east",
            Self::SouthEast => "south_east",
            Self::South => "south",
            Self::SouthWest => "south_west",
            Self::West => "west",
            Self::NorthWest => "north_west",
        };
        f.write_str(name)
    }
}

/// The four effective orientations an anatomy can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyFacing {
    /// Identity transform.
    North,
    /// Quarter turn clockwise.
    East,
    /// Half turn.
    South,
    /// Quarter turn counter-clockwise.
    West,
}

impl BodyFacing {
    /// All four buckets in clockwise order.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Rotate a body-local offset into world-aligned space.
    pub const fn rotate(self, offset: Offset) -> Offset {
        let Offset { x, y } = offset;
        match self {
            Self::North => Offset::new(x, y),
            Self::East => Offset::new(y.saturating_neg(), x),
            Self::South => Offset::new(x.saturating_neg(), y.saturating_neg()),
            Self::West => Offset::new(y, x.saturating_neg()),
        }
    }

    /// Quarter turn clockwise.
    #[must_use]
    pub const fn rotate_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Quarter turn counter-clockwise.
    #[must_use]
    pub const fn rotate_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// The canonical compass direction for this bucket.
    pub const fn direction(self) -> Direction {
        match self {
            Self::North => Direction::North,
            Self::East => Direction::East,
            Self::South => Direction::South,
            Self::West => Direction::West,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_offsets() -> Vec<Offset> {
        let mut offsets = Vec::new();
        for x in -3..=3 {
            for y in -3..=3 {
                offsets.push(Offset::new(x, y));
            }
        }
        offsets
    }

    #[test]
    fn opposite_is_involutive() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
    }

    #[test]
    fn opposite_offsets_cancel() {
        for d in Direction::ALL {
            assert_eq!(d.offset().add(d.opposite().offset()), Offset::ORIGIN);
        }
    }

    #[test]
    fn rotation_is_closed_over_eight_steps() {
        for d in Direction::ALL {
            let mut right = d;
            let mut left = d;
            for _ in 0..8 {
                right = right.rotate_right();
                left = left.rotate_left();
            }
            assert_eq!(right, d);
            assert_eq!(left, d);
            assert_eq!(d.rotate_right().rotate_left(), d);
        }
    }

    #[test]
    fn index_roundtrip() {
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
            assert_eq!(Direction::from_index(i), *d);
        }
        assert_eq!(Direction::from_index(9), Direction::NorthEast);
    }

    #[test]
    fn north_orientation_is_identity() {
        for d in Direction::ALL {
            assert_eq!(d.rotated_by(Direction::North), d);
        }
        assert_eq!(Direction::North.rotated_by(Direction::NorthEast), Direction::NorthEast);
        assert_eq!(Direction::East.rotated_by(Direction::South), Direction::West);
    }

    #[test]
    fn buckets_follow_collapse_table() {
        assert_eq!(Direction::North.facing(), BodyFacing::North);
        assert_eq!(Direction::NorthEast.facing(), BodyFacing::East);
        assert_eq!(Direction::East.facing(), BodyFacing::East);
        assert_eq!(Direction::SouthEast.facing(), BodyFacing::East);
        assert_eq!(Direction::South.facing(), BodyFacing::South);
        assert_eq!(Direction::SouthWest.facing(), BodyFacing::West);
        assert_eq!(Direction::West.facing(), BodyFacing::West);
        assert_eq!(Direction::NorthWest.facing(), BodyFacing::West);
    }

    #[test]
    fn transforms_match_table() {
        let p = Offset::new(2, 1);
        assert_eq!(BodyFacing::North.rotate(p), Offset::new(2, 1));
        assert_eq!(BodyFacing::East.rotate(p), Offset::new(-1, 2));
        assert_eq!(BodyFacing::South.rotate(p), Offset::new(-2, -1));
        assert_eq!(BodyFacing::West.rotate(p), Offset::new(1, -2));
    }

    #[test]
    fn four_quarter_turns_are_identity_for_every_bucket() {
        for start in BodyFacing::ALL {
            for offset in sample_offsets() {
                let expected = start.rotate(offset);

                let mut right = start;
                let mut left = start;
                for _ in 0..4 {
                    right = right.rotate_right();
                    left = left.rotate_left();
                }
                assert_eq!(right.rotate(offset), expected);
                assert_eq!(left.rotate(offset), expected);
            }
        }
    }

    #[test]
    fn quarter_turn_composes_transforms() {
        // Rotating the bucket right once equals applying the east transform
        // on top of the current one.
        for start in BodyFacing::ALL {
            for offset in sample_offsets() {
                let composed = BodyFacing::East.rotate(start.rotate(offset));
                assert_eq!(start.rotate_right().rotate(offset), composed);
            }
        }
    }

    #[test]
    fn chebyshev_and_manhattan() {
        assert_eq!(Offset::new(-3, 2).chebyshev(), 3);
        assert_eq!(Offset::new(1, 1).manhattan(Offset::new(-2, 3)), 5);
        assert_eq!(Offset::ORIGIN.step(Direction::SouthWest, 2), Offset::new(-2, 2));
    }
}
