//! Random rectangle stamping

use serde::{Deserialize, Serialize};

use super::Effect;
use crate::grid::{Grid, TileGrid, TileId};
use crate::rng::RegionRng;

/// Value written by a stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Replace {
    /// Every stamp writes the same value.
    Fixed(TileId),
    /// Each stamp writes the next value, counting up from `from`.
    Ascending { from: TileId },
}

/// Stamp step-aligned rectangles over cells that all hold `target`.
///
/// Anchors are `k * step + 1`; edge lengths are `min_size + j * step` up to
/// `max_size`. A rectangle is only stamped if it lies fully inside the local
/// grid and every covered cell equals `target`. Each rejected rectangle uses
/// up one attempt; the effect stops when none remain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaStamp {
    pub target: TileId,
    pub replace: Replace,
    pub min_size: usize,
    pub max_size: usize,
    #[serde(default = "default_step")]
    pub step: usize,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

fn default_step() -> usize {
    1
}

fn default_attempts() -> u32 {
    1
}

impl AreaStamp {
    pub fn new(target: TileId, replace: Replace, min_size: usize, max_size: usize) -> Self {
        Self {
            target,
            replace,
            min_size,
            max_size,
            step: default_step(),
            attempts: default_attempts(),
        }
    }

    pub fn step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Run the stamping loop, asking `next_value` once per accepted
    /// rectangle. Returns the number of rectangles stamped.
    ///
    /// A value equal to `target` is treated as a rejected attempt.
    pub fn stamp_with<G: TileGrid>(
        &self,
        data: &mut G,
        rng: &mut RegionRng,
        mut next_value: impl FnMut() -> TileId,
    ) -> usize {
        let step = self.step.max(1);
        let anchors = data.size().saturating_sub(1).div_ceil(step);
        let lengths = self.max_size.saturating_sub(self.min_size) / step + 1;

        let mut attempts = self.attempts;
        let mut stamped = 0;

        while attempts > 0 {
            let x = (rng.below(anchors) * step + 1) as i32;
            let y = (rng.below(anchors) * step + 1) as i32;
            let width = (self.min_size + rng.below(lengths) * step) as i32;
            let height = (self.min_size + rng.below(lengths) * step) as i32;

            if !self.can_stamp(data, x, y, width, height) {
                attempts -= 1;
                continue;
            }

            let value = next_value();
            if value == self.target {
                attempts -= 1;
                continue;
            }

            for i in 0..width {
                for j in 0..height {
                    data.set(x + i, y + j, value);
                }
            }
            stamped += 1;
        }

        stamped
    }

    fn can_stamp<G: TileGrid>(&self, data: &G, x: i32, y: i32, width: i32, height: i32) -> bool {
        if width <= 0 || height <= 0 {
            return false;
        }
        (0..width).all(|i| {
            (0..height).all(|j| {
                data.in_local_range(x + i, y + j) && data.get(x + i, y + j) == Some(self.target)
            })
        })
    }
}

impl Effect for AreaStamp {
    fn apply<G: TileGrid>(&self, data: &mut G, rng: &mut RegionRng) -> Option<Grid> {
        match self.replace {
            Replace::Fixed(value) => {
                self.stamp_with(data, rng, || value);
            }
            Replace::Ascending { from } => {
                let mut next = from;
                self.stamp_with(data, rng, || {
                    let value = next;
                    next = next.wrapping_add(1);
                    value
                });
            }
        }
        None
    }
}
