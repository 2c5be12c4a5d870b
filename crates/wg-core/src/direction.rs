//! Cardinal directions
//!
//! The enumeration order (N, E, S, W) is load-bearing: flood fill and maze
//! growth consume random values per direction in this order.

use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Unit step `(dx, dy)`; north is toward negative `y`.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// All four directions in N, E, S, W order.
    pub fn cardinals() -> DirectionIter {
        Direction::iter()
    }
}
