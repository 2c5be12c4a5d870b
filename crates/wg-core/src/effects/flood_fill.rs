//! Probabilistic flood fill

use serde::{Deserialize, Serialize};

use super::Effect;
use crate::direction::Direction;
use crate::grid::{Grid, TileGrid, TileId};
use crate::position::Position;
use crate::rng::RegionRng;

/// Depth-first fill from `start`, replacing `target` with `replace`.
///
/// Each filled cell pushes its N, E, S, W neighbors onto a stack, each with
/// probability `spread`; pushed neighbors carry `spread * decay`. With the
/// defaults (`spread = 1`, `decay = 1`) this is an ordinary 4-way fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloodFill {
    pub start: Position,
    pub target: TileId,
    pub replace: TileId,
    #[serde(default = "default_one")]
    pub spread: f64,
    #[serde(default = "default_one")]
    pub decay: f64,
}

fn default_one() -> f64 {
    1.0
}

impl FloodFill {
    pub fn new(start: Position, target: TileId, replace: TileId) -> Self {
        Self {
            start,
            target,
            replace,
            spread: 1.0,
            decay: 1.0,
        }
    }

    pub fn spread(mut self, spread: f64, decay: f64) -> Self {
        self.spread = spread;
        self.decay = decay;
        self
    }
}

impl Effect for FloodFill {
    fn apply<G: TileGrid>(&self, data: &mut G, rng: &mut RegionRng) -> Option<Grid> {
        if self.target == self.replace {
            return None;
        }

        let mut stack = vec![(self.start.x, self.start.y, self.spread)];
        while let Some((x, y, spread)) = stack.pop() {
            if data.get(x, y) != Some(self.target) {
                continue;
            }
            data.set(x, y, self.replace);
            for dir in Direction::cardinals() {
                if rng.chance(spread) {
                    let (dx, dy) = dir.delta();
                    stack.push((x + dx, y + dy, spread * self.decay));
                }
            }
        }
        None
    }
}
