//! Majority smoothing

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Effect;
use crate::grid::{Grid, TileGrid, TileId};
use crate::rng::RegionRng;

/// Replace each cell with the most common value in its 3x3 neighborhood.
///
/// Unresolvable neighbors are skipped. Ties go to the lowest tile id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorityRules;

impl MajorityRules {
    fn majority<G: TileGrid>(data: &G, x: i32, y: i32) -> Option<TileId> {
        let mut tally: BTreeMap<TileId, u32> = BTreeMap::new();
        for i in -1..=1 {
            for j in -1..=1 {
                if let Some(value) = data.get(x + i, y + j) {
                    *tally.entry(value).or_insert(0) += 1;
                }
            }
        }

        let mut best: Option<(TileId, u32)> = None;
        for (value, count) in tally {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value)
    }
}

impl Effect for MajorityRules {
    fn apply<G: TileGrid>(&self, data: &mut G, _rng: &mut RegionRng) -> Option<Grid> {
        let grid: &G = data;
        Some(grid.map(|value, x, y| Self::majority(grid, x, y).unwrap_or(value)))
    }
}
