//! Region type catalog and type selection

use std::fmt;

use crate::grid::Grid;
use crate::position::Position;
use crate::rng::{RegionRng, Weighted, WeightedTable};
use crate::segment::SegmentView;

/// Fills a freshly built region. Writes may reach already materialized
/// neighbors; a returned grid is committed over the region's own segment.
pub type Initializer = Box<dyn Fn(&mut SegmentView<'_>, &mut RegionRng) -> Option<Grid>>;

/// Picks the type of a region about to be materialized.
pub type ChoosePolicy = Box<dyn Fn(Position, &RegionCatalog, &mut RegionRng) -> RegionChoice>;

/// Result of a [`ChoosePolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionChoice {
    Named(String),
    /// Resolved by weighted sampling with the same stream.
    Weighted(Vec<Weighted<String>>),
}

/// A named kind of region.
pub struct RegionType {
    pub name: String,
    /// Weight used by the default choose policy.
    pub weight: u32,
    init: Option<Initializer>,
}

impl RegionType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: 1,
            init: None,
        }
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut SegmentView<'_>, &mut RegionRng) -> Option<Grid> + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    pub fn initializer(&self) -> Option<&Initializer> {
        self.init.as_ref()
    }
}

impl fmt::Debug for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionType")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("init", &self.init.is_some())
            .finish()
    }
}

/// Declared region types, in declaration order.
#[derive(Debug, Default)]
pub struct RegionCatalog {
    types: Vec<RegionType>,
}

impl RegionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_types(types: impl IntoIterator<Item = RegionType>) -> Self {
        let mut catalog = Self::new();
        for region_type in types {
            catalog.insert(region_type);
        }
        catalog
    }

    /// Add a type, replacing any earlier type with the same name.
    pub fn insert(&mut self, region_type: RegionType) {
        match self.types.iter_mut().find(|t| t.name == region_type.name) {
            Some(existing) => *existing = region_type,
            None => self.types.push(region_type),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RegionType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionType> {
        self.types.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.name.as_str())
    }
}

/// Default choose policy: sample the catalog by type weight.
pub fn choose_by_weight(_: Position, catalog: &RegionCatalog, _: &mut RegionRng) -> RegionChoice {
    RegionChoice::Weighted(
        catalog
            .iter()
            .map(|t| Weighted::new(t.name.clone(), t.weight))
            .collect(),
    )
}

impl RegionChoice {
    /// Resolve to a single name. `None` if a weighted list has no positive
    /// weight.
    pub fn resolve(self, rng: &mut RegionRng) -> Option<String> {
        match self {
            RegionChoice::Named(name) => Some(name),
            RegionChoice::Weighted(entries) => WeightedTable::new(entries).sample(rng).cloned(),
        }
    }
}
