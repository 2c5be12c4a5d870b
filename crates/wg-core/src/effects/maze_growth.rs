//! Recursive-backtracker maze carving on a step-2 lattice

use serde::{Deserialize, Serialize};

use super::Effect;
use crate::consts::DEFAULT_RUN_FACTOR;
use crate::direction::Direction;
use crate::grid::{Grid, TileGrid, TileId};
use crate::position::Position;
use crate::rng::RegionRng;

/// Carve a maze of `replace` tiles outward from `start`.
///
/// From the cell on top of the stack, a direction is open when the cell two
/// steps away exists, is not already `replace`, and is walkable (any value
/// when `walkable` is empty). If the previous direction is still open the
/// carver keeps going straight with probability `run_factor`; otherwise it
/// picks uniformly among the open directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeGrowth {
    pub start: Position,
    pub replace: TileId,
    #[serde(default = "default_run_factor")]
    pub run_factor: f64,
    #[serde(default)]
    pub walkable: Vec<TileId>,
}

fn default_run_factor() -> f64 {
    DEFAULT_RUN_FACTOR
}

impl MazeGrowth {
    pub fn new(start: Position, replace: TileId) -> Self {
        Self {
            start,
            replace,
            run_factor: DEFAULT_RUN_FACTOR,
            walkable: Vec::new(),
        }
    }

    pub fn run_factor(mut self, run_factor: f64) -> Self {
        self.run_factor = run_factor;
        self
    }

    pub fn walkable(mut self, walkable: impl IntoIterator<Item = TileId>) -> Self {
        self.walkable = walkable.into_iter().collect();
        self
    }

    fn is_open<G: TileGrid>(&self, data: &G, x: i32, y: i32) -> bool {
        match data.get(x, y) {
            Some(value) => {
                value != self.replace
                    && (self.walkable.is_empty() || self.walkable.contains(&value))
            }
            None => false,
        }
    }
}

impl Effect for MazeGrowth {
    fn apply<G: TileGrid>(&self, data: &mut G, rng: &mut RegionRng) -> Option<Grid> {
        let mut stack = vec![(self.start.x, self.start.y)];
        let mut last: Option<Direction> = None;
        data.set(self.start.x, self.start.y, self.replace);

        while let Some(&(x, y)) = stack.last() {
            let grid: &G = data;
            let open: Vec<Direction> = Direction::cardinals()
                .filter(|dir| {
                    let (dx, dy) = dir.delta();
                    self.is_open(grid, x + dx * 2, y + dy * 2)
                })
                .collect();

            if open.is_empty() {
                stack.pop();
                last = None;
                continue;
            }

            let dir = match last {
                Some(prev) if open.contains(&prev) && rng.chance(self.run_factor) => prev,
                _ => open[rng.below(open.len())],
            };

            let (dx, dy) = dir.delta();
            data.set(x + dx, y + dy, self.replace);
            data.set(x + dx * 2, y + dy * 2, self.replace);
            stack.push((x + dx * 2, y + dy * 2));
            last = Some(dir);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carve(size: usize, seed: u64, run_factor: f64) -> Grid {
        let mut grid = Grid::new(size, 0);
        let mut rng = RegionRng::new(seed);
        MazeGrowth::new(Position::ORIGIN, 1)
            .run_factor(run_factor)
            .apply(&mut grid, &mut rng);
        grid
    }

    #[test]
    fn test_seven_by_seven_carve_shape() {
        for seed in 0..16 {
            let grid = carve(7, seed, 0.0);
            // 16 lattice cells joined by the 15 walls of a spanning tree
            assert_eq!(grid.count(1), 31, "seed {seed}");
            for x in (0..7).step_by(2) {
                for y in (0..7).step_by(2) {
                    assert_eq!(grid.get(x, y), Some(1));
                }
            }
            for x in (1..7).step_by(2) {
                for y in (1..7).step_by(2) {
                    assert_eq!(grid.get(x, y), Some(0));
                }
            }
        }
    }

    #[test]
    fn test_seven_by_seven_seed_42_layout() {
        // Rows are indexed [x][y].
        let expected = Grid::from_rows(&[
            vec![1, 1, 1, 1, 1, 0, 1],
            vec![0, 0, 0, 0, 1, 0, 1],
            vec![1, 1, 1, 0, 1, 1, 1],
            vec![1, 0, 1, 0, 0, 0, 1],
            vec![1, 0, 1, 1, 1, 0, 1],
            vec![1, 0, 0, 0, 0, 0, 1],
            vec![1, 1, 1, 1, 1, 1, 1],
        ]);
        assert_eq!(carve(7, 42, 0.0), expected);
    }

    #[test]
    fn test_fixed_seed_reproduces_carve() {
        assert_eq!(carve(7, 42, 0.0), carve(7, 42, 0.0));
        assert_eq!(carve(11, 9, 0.8), carve(11, 9, 0.8));
    }

    #[test]
    fn test_walkable_restricts_carving() {
        let mut grid = Grid::new(7, 0);
        // Block the lattice cell at (4, 0) and everything east of it.
        for y in 0..7 {
            grid.set(4, y, 5);
        }
        let mut rng = RegionRng::new(2);
        MazeGrowth::new(Position::ORIGIN, 1)
            .walkable([0])
            .apply(&mut grid, &mut rng);
        assert_eq!(grid.count(5), 7);
        assert_eq!(grid.get(6, 0), Some(0));
        assert_eq!(grid.get(2, 6), Some(1));
    }
}
