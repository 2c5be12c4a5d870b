//! Regions and their mutation overlays

use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::grid::{TileGrid, TileId};
use crate::position::Position;
use crate::segment::DataSegment;

/// Per-region seed. Defaults to a packing of the region's position.
pub type RegionSeed = u64;

/// Nested `x -> y -> value` form used for export.
pub type NestedMutations = BTreeMap<usize, BTreeMap<usize, TileId>>;

/// Insertion-ordered log of explicit edits, keyed by local coordinate.
///
/// Rewriting a coordinate updates its value in place and keeps its original
/// position in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOverlay {
    entries: Vec<((usize, usize), TileId)>,
    index: HashMap<(usize, usize), usize>,
}

impl MutationOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, x: usize, y: usize, value: TileId) {
        match self.index.get(&(x, y)) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert((x, y), self.entries.len());
                self.entries.push(((x, y), value));
            }
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<TileId> {
        self.index.get(&(x, y)).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, TileId)> + '_ {
        self.entries.iter().map(|&((x, y), v)| (x, y, v))
    }

    /// Write every entry onto `grid`, in insertion order.
    pub fn replay<G: TileGrid>(&self, grid: &mut G) {
        for (x, y, value) in self.iter() {
            grid.set(x as i32, y as i32, value);
        }
    }

    pub fn to_nested(&self) -> NestedMutations {
        let mut nested = NestedMutations::new();
        for (x, y, value) in self.iter() {
            nested.entry(x).or_default().insert(y, value);
        }
        nested
    }

    pub fn from_nested(nested: &NestedMutations) -> Self {
        let mut overlay = Self::new();
        for (&x, column) in nested {
            for (&y, &value) in column {
                overlay.record(x, y, value);
            }
        }
        overlay
    }
}

/// One fixed-size square of the world.
#[derive(Debug, Clone)]
pub struct Region {
    pub position: Position,
    pub region_type: String,
    pub seed: RegionSeed,
    pub mutations: MutationOverlay,
    pub data: DataSegment,
}

impl Region {
    /// Create a region with a freshly filled segment and an empty overlay.
    pub fn new(position: Position, region_type: impl Into<String>, size: usize) -> Self {
        Self {
            position,
            region_type: region_type.into(),
            seed: Self::default_seed(position),
            mutations: MutationOverlay::new(),
            data: DataSegment::new(position, size),
        }
    }

    pub fn with_seed(mut self, seed: RegionSeed) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_mutations(mut self, mutations: MutationOverlay) -> Self {
        self.mutations = mutations;
        self
    }

    /// Stable encoding of a position: `x` in the high word, `y` in the low.
    pub fn default_seed(position: Position) -> RegionSeed {
        (u64::from(position.x as u32) << 32) | u64::from(position.y as u32)
    }

    /// Record an edit and apply it. Out-of-range coordinates are dropped.
    pub fn mutate(&mut self, x: i32, y: i32, value: TileId) {
        if !self.data.in_local_range(x, y) {
            return;
        }
        self.data.set(x, y, value);
        self.mutations.record(x as usize, y as usize, value);
    }

    /// Reapply the overlay after a generation pass.
    pub fn replay_mutations(&mut self) {
        self.mutations.replay(&mut self.data);
    }
}
