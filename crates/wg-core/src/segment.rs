//! Region tile segments and cross-boundary views
//!
//! A [`DataSegment`] is the grid a region owns; on its own it only sees its
//! local square. A [`SegmentView`] borrows the whole region table and
//! resolves coordinates past the edge of its origin region into the sibling
//! region that holds them. Regions never point at each other directly.

use hashbrown::HashMap;

use crate::consts::EMPTY_TILE;
use crate::grid::{Grid, TileGrid, TileId};
use crate::position::{Bounds, Position};
use crate::region::Region;

/// Materialized regions keyed by lattice position.
pub type RegionTable = HashMap<Position, Region>;

/// Tile grid owned by one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSegment {
    position: Position,
    grid: Grid,
}

impl DataSegment {
    pub fn new(position: Position, size: usize) -> Self {
        Self {
            position,
            grid: Grid::new(size, EMPTY_TILE),
        }
    }

    /// Position of the owning region.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl TileGrid for DataSegment {
    fn size(&self) -> usize {
        self.grid.size()
    }

    fn get(&self, x: i32, y: i32) -> Option<TileId> {
        self.grid.get(x, y)
    }

    fn set(&mut self, x: i32, y: i32, value: TileId) {
        self.grid.set(x, y, value);
    }
}

/// A region's segment seen through the shared region table.
pub struct SegmentView<'w> {
    regions: &'w mut RegionTable,
    origin: Position,
    bounds: Bounds,
    size: usize,
}

impl<'w> SegmentView<'w> {
    pub fn new(regions: &'w mut RegionTable, origin: Position, bounds: Bounds, size: usize) -> Self {
        Self {
            regions,
            origin,
            bounds,
            size,
        }
    }

    /// Map `(x, y)` to the owning region's position and a local coordinate.
    ///
    /// The region step along each axis is the Euclidean quotient by the
    /// region size; wrapped axes are then normalized.
    fn resolve(&self, x: i32, y: i32) -> (Position, i32, i32) {
        let size = self.size.max(1) as i32;
        let target = self
            .origin
            .offset(x.div_euclid(size), y.div_euclid(size));
        (
            self.bounds.normalize(target),
            x.rem_euclid(size),
            y.rem_euclid(size),
        )
    }

    /// Set a tile and record it in the owning region's mutation overlay.
    pub fn mutate(&mut self, x: i32, y: i32, value: TileId) {
        let (position, lx, ly) = self.resolve(x, y);
        if let Some(region) = self.regions.get_mut(&position) {
            region.mutate(lx, ly, value);
        }
    }
}

impl TileGrid for SegmentView<'_> {
    fn size(&self) -> usize {
        self.size
    }

    fn get(&self, x: i32, y: i32) -> Option<TileId> {
        let (position, lx, ly) = self.resolve(x, y);
        self.regions.get(&position)?.data.get(lx, ly)
    }

    fn set(&mut self, x: i32, y: i32, value: TileId) {
        let (position, lx, ly) = self.resolve(x, y);
        if let Some(region) = self.regions.get_mut(&position) {
            region.data.set(lx, ly, value);
        }
    }
}
