//! World lattice
//!
//! The [`World`] owns every materialized region, keyed by position, and
//! drives their lifecycle: choosing a type, building the segment, running
//! the type initializer, running generation passes and replaying edits.
//!
//! Regions are created lazily around a cursor. Evicting a region keeps its
//! [`RegionRecord`], so it comes back with the same type, seed and edits.

mod catalog;
pub mod options;
pub mod save;

use std::collections::BTreeMap;
use std::path::Path;

use hashbrown::HashSet;
use tracing::debug;

pub use catalog::{
    ChoosePolicy, Initializer, RegionCatalog, RegionChoice, RegionType, choose_by_weight,
};
pub use options::{OptionsError, WorldOptions};
pub use save::{RegionRecord, SaveError, WorldSnapshot, load_snapshot, save_snapshot};

use crate::consts::DEFAULT_REGION_SIZE;
use crate::error::{GenError, GenResult};
use crate::generator::RegionGenerator;
use crate::grid::{TileGrid, TileId};
use crate::position::{Area, Bounds, Position};
use crate::region::{MutationOverlay, Region};
use crate::rng::{Discriminant, RegionRng, WorldSeed, derive_stream};
use crate::segment::{DataSegment, RegionTable, SegmentView};

/// Caller-supplied generation pass run by [`World::generate`].
pub type GenerationPolicy = Box<dyn Fn(&mut RegionGenerator<'_>) -> GenResult<()>>;

/// Configures and validates a [`World`].
pub struct WorldBuilder {
    seed: WorldSeed,
    position: Position,
    bounds: Bounds,
    region_size: usize,
    catalog: RegionCatalog,
    choose_region: Option<ChoosePolicy>,
    generation: Option<GenerationPolicy>,
    records: BTreeMap<Position, RegionRecord>,
}

impl WorldBuilder {
    pub fn new(seed: impl Into<WorldSeed>) -> Self {
        Self {
            seed: seed.into(),
            position: Position::ORIGIN,
            bounds: Bounds::UNBOUNDED,
            region_size: DEFAULT_REGION_SIZE,
            catalog: RegionCatalog::new(),
            choose_region: None,
            generation: None,
            records: BTreeMap::new(),
        }
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn region_size(mut self, size: usize) -> Self {
        self.region_size = size;
        self
    }

    pub fn region_type(mut self, region_type: RegionType) -> Self {
        self.catalog.insert(region_type);
        self
    }

    pub fn choose_region<F>(mut self, policy: F) -> Self
    where
        F: Fn(Position, &RegionCatalog, &mut RegionRng) -> RegionChoice + 'static,
    {
        self.choose_region = Some(Box::new(policy));
        self
    }

    pub fn generation<F>(mut self, policy: F) -> Self
    where
        F: Fn(&mut RegionGenerator<'_>) -> GenResult<()> + 'static,
    {
        self.generation = Some(Box::new(policy));
        self
    }

    /// Start from a snapshot: seed, cursor, lattice shape and region records.
    pub fn restore(mut self, snapshot: WorldSnapshot) -> Self {
        self.records = snapshot
            .records()
            .map(|(position, record)| (position, record.clone()))
            .collect();
        self.seed = snapshot.seed;
        self.position = snapshot.position;
        self.bounds = snapshot.bounds;
        self.region_size = snapshot.region_size;
        self
    }

    /// Validate the configuration and materialize the cursor's neighborhood.
    pub fn build(self) -> GenResult<World> {
        self.bounds.validate()?;
        if self.catalog.is_empty() {
            return Err(GenError::NoRegionTypesDefined);
        }

        let position = self.bounds.clamp(self.position);
        let mut world = World {
            seed: self.seed,
            position,
            bounds: self.bounds,
            region_size: self.region_size,
            catalog: self.catalog,
            choose_region: self
                .choose_region
                .unwrap_or_else(|| Box::new(choose_by_weight)),
            generation: self.generation,
            regions: RegionTable::new(),
            records: self.records,
        };
        world.materialize(position.neighborhood())?;
        Ok(world)
    }
}

/// Sparse lattice of regions around a cursor.
pub struct World {
    seed: WorldSeed,
    position: Position,
    bounds: Bounds,
    region_size: usize,
    catalog: RegionCatalog,
    choose_region: ChoosePolicy,
    generation: Option<GenerationPolicy>,
    regions: RegionTable,
    records: BTreeMap<Position, RegionRecord>,
}

impl World {
    pub fn builder(seed: impl Into<WorldSeed>) -> WorldBuilder {
        WorldBuilder::new(seed)
    }

    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Cursor position.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn region_size(&self) -> usize {
        self.region_size
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// Number of materialized regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Materialized regions, in no particular order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// The region at `position` after wrapping, if materialized.
    pub fn region(&self, position: Position) -> Option<&Region> {
        self.regions.get(&self.bounds.normalize(position))
    }

    pub fn region_at(&self, x: i32, y: i32) -> Option<&Region> {
        self.region(Position::new(x, y))
    }

    pub fn region_mut(&mut self, position: Position) -> Option<&mut Region> {
        self.regions.get_mut(&self.bounds.normalize(position))
    }

    /// Cross-boundary view of the region at `position`.
    pub fn view(&mut self, position: Position) -> SegmentView<'_> {
        let origin = self.bounds.normalize(position);
        SegmentView::new(&mut self.regions, origin, self.bounds, self.region_size)
    }

    /// Create every missing, in-bounds region in `area`, in area order.
    pub fn materialize(&mut self, area: Area) -> GenResult<()> {
        for position in area.positions() {
            let position = self.bounds.normalize(position);
            if !self.bounds.contains(position) || self.regions.contains_key(&position) {
                continue;
            }

            let region = match self.records.get(&position) {
                Some(record) => Region::new(position, record.region_type.clone(), self.region_size)
                    .with_seed(record.seed)
                    .with_mutations(MutationOverlay::from_nested(&record.mutations)),
                None => {
                    let mut rng = derive_stream(self.seed, Discriminant::Position(position));
                    let choice = (self.choose_region)(position, &self.catalog, &mut rng);
                    let name = choice.resolve(&mut rng).unwrap_or_default();
                    Region::new(position, name, self.region_size)
                }
            };

            if !self.catalog.contains(&region.region_type) {
                return Err(GenError::InvalidRegionType(region.region_type));
            }

            debug!(
                x = position.x,
                y = position.y,
                region_type = %region.region_type,
                "materializing region"
            );
            self.records.insert(position, RegionRecord::of(&region));
            self.regions.insert(position, region);
            self.initialize(position);
        }
        Ok(())
    }

    /// Run the type initializer on a fresh segment, then replay edits.
    ///
    /// Initializers may write into neighbors through the view, so every
    /// materialized region's edits are replayed, not just this one's.
    fn initialize(&mut self, position: Position) {
        let Some((region_type, seed)) = self
            .regions
            .get(&position)
            .map(|r| (r.region_type.clone(), r.seed))
        else {
            return;
        };

        let init = self
            .catalog
            .get(&region_type)
            .and_then(RegionType::initializer);
        if let Some(init) = init {
            let mut rng = derive_stream(self.seed, Discriminant::Region(seed));
            let mut view =
                SegmentView::new(&mut self.regions, position, self.bounds, self.region_size);
            if let Some(grid) = init(&mut view, &mut rng) {
                view.commit(&grid);
            }
        }

        self.replay_all();
    }

    fn replay_all(&mut self) {
        self.regions.values_mut().for_each(Region::replay_mutations);
    }

    /// Rebuild the segments of materialized regions in `area` from scratch.
    pub fn reinitialize(&mut self, area: Area) {
        for position in self.resolve_area(area) {
            if let Some(region) = self.regions.get_mut(&position) {
                region.data = DataSegment::new(position, self.region_size);
            }
            self.initialize(position);
        }
    }

    /// Move the cursor and materialize its new neighborhood.
    ///
    /// Non-wrapping axes clamp to the bounds. Fails with `OutOfBounds` when
    /// a nonzero move leaves the cursor where it was.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> GenResult<()> {
        if dx == 0 && dy == 0 {
            return Ok(());
        }
        let target = self.bounds.clamp(self.position.offset(dx, dy));
        if target == self.position {
            return Err(GenError::OutOfBounds);
        }
        self.position = target;
        self.materialize(target.neighborhood())
    }

    pub fn move_north(&mut self) -> GenResult<()> {
        self.move_by(0, -1)
    }

    pub fn move_east(&mut self) -> GenResult<()> {
        self.move_by(1, 0)
    }

    pub fn move_south(&mut self) -> GenResult<()> {
        self.move_by(0, 1)
    }

    pub fn move_west(&mut self) -> GenResult<()> {
        self.move_by(-1, 0)
    }

    /// Materialize `area` and run the stored generation policy over it.
    pub fn generate(&mut self, area: Area) -> GenResult<()> {
        let policy = self.generation.take();
        let result = match &policy {
            Some(policy) => self.generate_with(area, |generator| policy(generator)),
            None => self.generate_with(area, |_| Ok(())),
        };
        self.generation = policy;
        result
    }

    /// Materialize `area` and run `policy` over its regions, then replay
    /// the edits of every materialized region.
    ///
    /// In-place effects can reach past the selected regions, and a policy
    /// can fail halfway through, so the replay covers the whole table and
    /// runs before the policy's error is returned.
    pub fn generate_with<F>(&mut self, area: Area, policy: F) -> GenResult<()>
    where
        F: FnOnce(&mut RegionGenerator<'_>) -> GenResult<()>,
    {
        self.materialize(area)?;
        let positions = self.resolve_area(area);
        debug!(regions = positions.len(), "generating area");

        let mut generator = RegionGenerator::new(
            &mut self.regions,
            &self.catalog,
            self.seed,
            self.bounds,
            self.region_size,
            positions.iter().copied(),
        );
        let result = policy(&mut generator);

        self.replay_all();
        result
    }

    /// Rebuild every region in `area` and generate it again.
    pub fn regenerate(&mut self, area: Area) -> GenResult<()> {
        self.materialize(area)?;
        self.reinitialize(area);
        self.generate(area)
    }

    /// Evict the regions in `area`. Their records are kept.
    pub fn remove(&mut self, area: Area) {
        for position in self.resolve_area(area) {
            if let Some(region) = self.regions.remove(&position) {
                debug!(x = position.x, y = position.y, "evicting region");
                self.records.insert(position, RegionRecord::of(&region));
            }
        }
    }

    /// Edit one tile of a materialized region and record the edit.
    ///
    /// Returns `false` if the region is not materialized or `(x, y)` is
    /// outside it.
    pub fn mutate(&mut self, position: Position, x: i32, y: i32, value: TileId) -> bool {
        let position = self.bounds.normalize(position);
        let Some(region) = self.regions.get_mut(&position) else {
            return false;
        };
        if !region.data.in_local_range(x, y) {
            return false;
        }
        region.mutate(x, y, value);
        if let Some(record) = self.records.get_mut(&position) {
            record.mutations = region.mutations.to_nested();
        }
        true
    }

    /// Export seed, cursor, lattice shape and a record per region.
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut snapshot = WorldSnapshot {
            seed: self.seed,
            position: self.position,
            bounds: self.bounds,
            region_size: self.region_size,
            initial_data: Default::default(),
        };
        for (&position, record) in &self.records {
            snapshot.insert_record(position, record.clone());
        }
        for (&position, region) in &self.regions {
            snapshot.insert_record(position, RegionRecord::of(region));
        }
        snapshot
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        save_snapshot(&self.snapshot(), path)
    }

    /// Normalized, materialized positions of `area` without duplicates, in
    /// area order.
    fn resolve_area(&self, area: Area) -> Vec<Position> {
        let mut seen = HashSet::new();
        area.positions()
            .map(|p| self.bounds.normalize(p))
            .filter(|p| self.regions.contains_key(p) && seen.insert(*p))
            .collect()
    }
}
