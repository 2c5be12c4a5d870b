//! Life-like cellular automaton step

use serde::{Deserialize, Serialize};

use super::Effect;
use crate::grid::{Grid, TileGrid, TileId};
use crate::rng::RegionRng;

/// One automaton generation over the 8-neighborhood.
///
/// A cell becomes `live` when at least `born` neighbors are live, stays
/// `live` when it already is and at least `survive` neighbors are live, and
/// is `dead` otherwise. Neighbors outside the resolvable area never count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellularAutomata {
    pub born: u32,
    pub survive: u32,
    pub live: TileId,
    pub dead: TileId,
}

impl CellularAutomata {
    pub fn new(born: u32, survive: u32, live: TileId, dead: TileId) -> Self {
        Self {
            born,
            survive,
            live,
            dead,
        }
    }

    fn live_neighbors<G: TileGrid>(&self, data: &G, x: i32, y: i32) -> u32 {
        let mut count = 0;
        for i in -1..=1 {
            for j in -1..=1 {
                if (i != 0 || j != 0) && data.get(x + i, y + j) == Some(self.live) {
                    count += 1;
                }
            }
        }
        count
    }
}

impl Effect for CellularAutomata {
    fn apply<G: TileGrid>(&self, data: &mut G, _rng: &mut RegionRng) -> Option<Grid> {
        let grid: &G = data;
        Some(grid.map(|value, x, y| {
            let count = self.live_neighbors(grid, x, y);
            if count >= self.born || (count >= self.survive && value == self.live) {
                self.live
            } else {
                self.dead
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_dead_is_fixed_point() {
        let mut grid = Grid::new(6, 0);
        let mut rng = RegionRng::new(0);
        let out = CellularAutomata::new(5, 4, 1, 0).apply(&mut grid, &mut rng);
        assert_eq!(out, Some(Grid::new(6, 0)));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let mut grid = Grid::from_rows(&[vec![1, 1, 1], vec![1, 0, 1], vec![1, 1, 1]]);
        let before = grid.clone();
        let mut rng = RegionRng::new(0);
        let out = CellularAutomata::new(5, 4, 1, 0)
            .apply(&mut grid, &mut rng)
            .unwrap();
        assert_eq!(grid, before);
        // center has 8 live neighbors and is born
        assert_eq!(out.get(1, 1), Some(1));
        // corners see two live neighbors: neither born nor surviving
        assert_eq!(out.get(0, 0), Some(0));
        // edges see 4 live neighbors and survive
        assert_eq!(out.get(0, 1), Some(1));
    }

    #[test]
    fn test_dead_cell_needs_born_threshold() {
        let mut grid = Grid::from_rows(&[vec![1, 1, 0], vec![1, 0, 0], vec![0, 0, 0]]);
        let mut rng = RegionRng::new(0);
        let out = CellularAutomata::new(4, 2, 1, 0)
            .apply(&mut grid, &mut rng)
            .unwrap();
        // (1, 1) has three live neighbors, below born, and was dead
        assert_eq!(out.get(1, 1), Some(0));
        // (0, 0) has two live neighbors and survives
        assert_eq!(out.get(0, 0), Some(1));
    }
}
