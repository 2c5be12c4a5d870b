//! Plain-text rendering
//!
//! Read-only: grids are accessed through `get` and never written. Each
//! output line is one `y`, each character one `x`, so north is up.

use crate::grid::{TileGrid, TileId};
use crate::position::Area;
use crate::world::World;

/// Character for tiles outside any materialized region.
pub const VOID_GLYPH: char = ' ';

/// Render one grid, mapping tiles to characters with `glyph`.
pub fn render_grid<G: TileGrid>(grid: &G, glyph: impl Fn(TileId) -> char) -> String {
    let size = grid.size() as i32;
    let mut out = String::with_capacity((grid.size() + 1) * grid.size());
    for y in 0..size {
        for x in 0..size {
            out.push(grid.get(x, y).map_or(VOID_GLYPH, &glyph));
        }
        out.push('\n');
    }
    out
}

/// Render every region of `area` side by side as one map.
///
/// Positions are wrapped through the world's bounds, so a wrapped axis
/// repeats. Unmaterialized regions render as [`VOID_GLYPH`].
pub fn render_area(world: &World, area: Area, glyph: impl Fn(TileId) -> char) -> String {
    let size = world.region_size() as i32;
    let mut out = String::new();
    for ry in area.min.y..=area.max.y {
        for y in 0..size {
            for rx in area.min.x..=area.max.x {
                let region = world.region_at(rx, ry);
                for x in 0..size {
                    let tile = region.and_then(|r| r.data.get(x, y));
                    out.push(tile.map_or(VOID_GLYPH, &glyph));
                }
            }
            out.push('\n');
        }
    }
    out
}

/// Digits for 0-9, then letters, then `?`.
pub fn default_glyph(tile: TileId) -> char {
    char::from_digit(tile, 36).unwrap_or('?')
}
