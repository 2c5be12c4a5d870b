//! Tile grids
//!
//! [`TileGrid`] is the surface every effect works against. It is
//! implemented by the plain [`Grid`], by a region's owned
//! [`DataSegment`](crate::DataSegment), and by the cross-boundary
//! [`SegmentView`](crate::SegmentView).
//!
//! Grids are indexed `[x][y]`; traversal is x-major.

use crate::consts::EMPTY_TILE;
use crate::pattern::{PatternMatch, PatternMatcher};
use crate::rng::{RegionRng, WeightedTable};

/// Opaque tile value. The core only compares and copies them.
pub type TileId = u32;

pub trait TileGrid {
    /// Edge length of the local square.
    fn size(&self) -> usize;

    /// Read a tile. `None` if the coordinate cannot be resolved.
    fn get(&self, x: i32, y: i32) -> Option<TileId>;

    /// Write a tile. Silently dropped if the coordinate cannot be resolved.
    fn set(&mut self, x: i32, y: i32, value: TileId);

    fn has_element_at(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some()
    }

    /// Whether `(x, y)` lies in `[0, size)` on both axes.
    fn in_local_range(&self, x: i32, y: i32) -> bool {
        let size = self.size() as i32;
        x >= 0 && x < size && y >= 0 && y < size
    }

    /// Visit every local cell in x-major order.
    fn each(&self, mut visit: impl FnMut(TileId, i32, i32)) {
        let size = self.size() as i32;
        for x in 0..size {
            for y in 0..size {
                if let Some(v) = self.get(x, y) {
                    visit(v, x, y);
                }
            }
        }
    }

    /// Compute a new grid of the same shape; `self` is left untouched.
    fn map(&self, mut f: impl FnMut(TileId, i32, i32) -> TileId) -> Grid {
        let size = self.size();
        let mut out = Grid::new(size, EMPTY_TILE);
        for x in 0..size as i32 {
            for y in 0..size as i32 {
                let v = self.get(x, y).unwrap_or(EMPTY_TILE);
                out.set(x, y, f(v, x, y));
            }
        }
        out
    }

    fn fill(&mut self, value: TileId) {
        self.fill_with(|_, _, _| value);
    }

    fn fill_with(&mut self, mut f: impl FnMut(TileId, i32, i32) -> TileId) {
        let size = self.size() as i32;
        for x in 0..size {
            for y in 0..size {
                let v = self.get(x, y).unwrap_or(EMPTY_TILE);
                self.set(x, y, f(v, x, y));
            }
        }
    }

    /// Fill every cell with a draw from `table`. No-op for an all-zero table.
    fn randomize(&mut self, table: &WeightedTable<TileId>, rng: &mut RegionRng) {
        if table.is_empty() {
            return;
        }
        let size = self.size() as i32;
        for x in 0..size {
            for y in 0..size {
                if let Some(&v) = table.sample(rng) {
                    self.set(x, y, v);
                }
            }
        }
    }

    /// Export as nested `[x][y]` vectors.
    fn to_rows(&self) -> Vec<Vec<TileId>> {
        let size = self.size() as i32;
        (0..size)
            .map(|x| {
                (0..size)
                    .map(|y| self.get(x, y).unwrap_or(EMPTY_TILE))
                    .collect()
            })
            .collect()
    }

    /// Bulk-load nested `[x][y]` vectors. Cells outside either shape are
    /// left alone.
    fn load_rows(&mut self, rows: &[Vec<TileId>]) {
        let size = self.size();
        for (x, column) in rows.iter().enumerate().take(size) {
            for (y, &v) in column.iter().enumerate().take(size) {
                self.set(x as i32, y as i32, v);
            }
        }
    }

    /// Copy a computed grid into the local cells.
    fn commit(&mut self, grid: &Grid) {
        let size = self.size().min(grid.size()) as i32;
        for x in 0..size {
            for y in 0..size {
                if let Some(v) = grid.get(x, y) {
                    self.set(x, y, v);
                }
            }
        }
    }

    /// For every local cell, report the first entry whose matcher accepts it.
    fn match_patterns<K: Clone>(&self, entries: &[(K, PatternMatcher)]) -> Vec<PatternMatch<K>>
    where
        Self: Sized,
    {
        let size = self.size() as i32;
        let mut found = Vec::new();
        for x in 0..size {
            for y in 0..size {
                if let Some((key, _)) = entries.iter().find(|(_, m)| m.matches(self, x, y)) {
                    found.push(PatternMatch {
                        key: key.clone(),
                        x,
                        y,
                    });
                }
            }
        }
        found
    }
}

/// Standalone square tile grid with no neighbors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<TileId>,
}

impl Grid {
    pub fn new(size: usize, value: TileId) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    /// Build from nested `[x][y]` vectors; the outer length sets the size.
    pub fn from_rows(rows: &[Vec<TileId>]) -> Self {
        let mut grid = Self::new(rows.len(), EMPTY_TILE);
        grid.load_rows(rows);
        grid
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_local_range(x, y) {
            Some(x as usize * self.size + y as usize)
        } else {
            None
        }
    }

    /// Number of cells holding `value`.
    pub fn count(&self, value: TileId) -> usize {
        self.cells.iter().filter(|&&v| v == value).count()
    }

    pub fn cells(&self) -> &[TileId] {
        &self.cells
    }
}

impl TileGrid for Grid {
    fn size(&self) -> usize {
        self.size
    }

    fn get(&self, x: i32, y: i32) -> Option<TileId> {
        self.index(x, y).map(|i| self.cells[i])
    }

    fn set(&mut self, x: i32, y: i32, value: TileId) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_sets_every_cell() {
        let mut grid = Grid::new(3, 0);
        grid.fill(6);
        assert_eq!(grid.to_rows(), vec![vec![6, 6, 6], vec![6, 6, 6], vec![6, 6, 6]]);
    }

    #[test]
    fn test_out_of_range_is_none_and_dropped() {
        let mut grid = Grid::new(2, 1);
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(0, 2), None);
        assert!(!grid.has_element_at(2, 2));
        grid.set(5, 5, 9);
        assert_eq!(grid.count(9), 0);
    }

    #[test]
    fn test_rows_are_x_major() {
        let grid = Grid::from_rows(&[vec![1, 2], vec![3, 4]]);
        assert_eq!(grid.get(0, 1), Some(2));
        assert_eq!(grid.get(1, 0), Some(3));
        let mut seen = Vec::new();
        grid.each(|v, _, _| seen.push(v));
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_map_does_not_mutate() {
        let grid = Grid::from_rows(&[vec![1, 2], vec![3, 4]]);
        let doubled = grid.map(|v, _, _| v * 2);
        assert_eq!(doubled.to_rows(), vec![vec![2, 4], vec![6, 8]]);
        assert_eq!(grid.to_rows(), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_fill_with_sees_coordinates() {
        let mut grid = Grid::new(3, 0);
        grid.fill_with(|_, x, y| (x * 10 + y) as TileId);
        assert_eq!(grid.get(2, 1), Some(21));
    }

    #[test]
    fn test_randomize_uses_table_values() {
        let mut grid = Grid::new(8, 0);
        let table = WeightedTable::uniform([1, 2, 3, 4]);
        let mut rng = RegionRng::new(5);
        grid.randomize(&table, &mut rng);
        assert!(grid.cells().iter().all(|v| (1..=4).contains(v)));
    }
}
