//! Selection and application pipeline over a batch of regions

use tracing::trace;

use crate::effects::{Effect, EffectConfig};
use crate::error::{GenError, GenResult};
use crate::grid::{Grid, TileGrid};
use crate::position::{Bounds, Position};
use crate::region::Region;
use crate::rng::{Discriminant, WorldSeed, derive_stream};
use crate::segment::{RegionTable, SegmentView};
use crate::world::RegionCatalog;

/// Runs effects against a fixed set of regions.
///
/// Grids returned by effects are held back until every selected region has
/// been processed, so within one pass no region sees another region's
/// computed result. In-place writes are visible immediately.
pub struct RegionGenerator<'w> {
    regions: &'w mut RegionTable,
    catalog: &'w RegionCatalog,
    world_seed: WorldSeed,
    bounds: Bounds,
    region_size: usize,
    positions: Vec<Position>,
    selection: Vec<Position>,
}

impl<'w> RegionGenerator<'w> {
    /// Build a generator over `positions`. Positions with no materialized
    /// region are skipped.
    pub fn new(
        regions: &'w mut RegionTable,
        catalog: &'w RegionCatalog,
        world_seed: WorldSeed,
        bounds: Bounds,
        region_size: usize,
        positions: impl IntoIterator<Item = Position>,
    ) -> Self {
        let positions: Vec<Position> = positions
            .into_iter()
            .filter(|p| regions.contains_key(p))
            .collect();
        Self {
            regions,
            catalog,
            world_seed,
            bounds,
            region_size,
            selection: positions.clone(),
            positions,
        }
    }

    /// Positions currently selected, in the order they are processed.
    pub fn selection(&self) -> &[Position] {
        &self.selection
    }

    /// Selected regions.
    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.selection.iter().filter_map(|p| self.regions.get(p))
    }

    /// Restrict the selection to regions of the given types, chosen from all
    /// regions the generator was built with.
    pub fn select<S: AsRef<str>>(&mut self, types: &[S]) -> GenResult<&mut Self> {
        if let Some(unknown) = types.iter().find(|t| !self.catalog.contains(t.as_ref())) {
            return Err(GenError::InvalidRegionType(unknown.as_ref().to_string()));
        }
        self.selection = self
            .positions
            .iter()
            .copied()
            .filter(|p| {
                self.regions
                    .get(p)
                    .is_some_and(|r| types.iter().any(|t| t.as_ref() == r.region_type))
            })
            .collect();
        Ok(self)
    }

    /// Select every region again.
    pub fn select_all(&mut self) -> &mut Self {
        self.selection = self.positions.clone();
        self
    }

    /// Run one pass: build an effect per selected region and apply it.
    ///
    /// Each region gets a stream derived from the world seed and its own
    /// seed, so a pass is reproducible regardless of batch composition.
    pub fn apply<E: Effect>(&mut self, mut factory: impl FnMut(&Region) -> E) -> &mut Self {
        let mut pending: Vec<(Position, Grid)> = Vec::new();

        for &position in &self.selection {
            let Some(region) = self.regions.get(&position) else {
                continue;
            };
            let effect = factory(region);
            let mut rng = derive_stream(self.world_seed, Discriminant::Region(region.seed));
            let mut view =
                SegmentView::new(self.regions, position, self.bounds, self.region_size);
            if let Some(grid) = effect.apply(&mut view, &mut rng) {
                pending.push((position, grid));
            }
            trace!(x = position.x, y = position.y, "effect applied");
        }

        for (position, grid) in pending {
            if let Some(region) = self.regions.get_mut(&position) {
                region.data.commit(&grid);
            }
        }
        self
    }

    /// Run `count` passes in sequence.
    pub fn apply_times<E: Effect>(
        &mut self,
        count: usize,
        mut factory: impl FnMut(&Region) -> E,
    ) -> &mut Self {
        for _ in 0..count {
            self.apply(&mut factory);
        }
        self
    }

    /// Apply a data-described effect to every selected region.
    pub fn apply_config(&mut self, config: &EffectConfig) -> &mut Self {
        trace!(effect = config.name(), "applying configured effect");
        self.apply(|_| config)
    }
}
