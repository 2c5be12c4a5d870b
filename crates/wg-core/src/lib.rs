//! wg-core: region lattice and tile generation for an unbounded 2D world
//!
//! The world is a sparse lattice of fixed-size square regions. Each region
//! owns a tile grid that effects can read and write as if the lattice were
//! one continuous map. All randomness is derived from a world seed and a
//! discriminant, so a given seed always reproduces the same world.
//!
//! This crate has no I/O beyond the JSON snapshot and options adapters in
//! [`world`].

pub mod effects;
pub mod render;
pub mod world;

mod consts;
mod direction;
mod error;
mod generator;
mod grid;
mod pattern;
mod position;
mod region;
mod rng;
mod segment;

pub use consts::*;
pub use direction::Direction;
pub use error::{GenError, GenResult};
pub use generator::RegionGenerator;
pub use grid::{Grid, TileGrid, TileId};
pub use pattern::{PatternCell, PatternMatch, PatternMatcher};
pub use position::{Area, Axis, AxisBounds, Bounds, Position};
pub use region::{MutationOverlay, Region, RegionSeed};
pub use rng::{Discriminant, RegionRng, Weighted, WeightedTable, WorldSeed, derive_stream};
pub use segment::{DataSegment, RegionTable, SegmentView};
pub use world::{RegionCatalog, RegionChoice, RegionType, World, WorldBuilder};
