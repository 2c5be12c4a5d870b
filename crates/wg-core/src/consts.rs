//! Shared defaults

use crate::grid::TileId;

/// Default width and height of a region, in tiles.
pub const DEFAULT_REGION_SIZE: usize = 32;

/// Tile value a freshly built segment is filled with.
pub const EMPTY_TILE: TileId = 0;

/// Default straight-run probability for maze carving.
pub const DEFAULT_RUN_FACTOR: f64 = 0.5;

/// Default smallest room edge for dungeon generation (odd).
pub const DEFAULT_MIN_ROOM_SIZE: usize = 5;

/// Default largest room edge for dungeon generation (odd).
pub const DEFAULT_MAX_ROOM_SIZE: usize = 13;

/// Default number of failed room placements before giving up.
pub const DEFAULT_ROOM_ATTEMPTS: u32 = 8;
