//! Generation effects
//!
//! An effect reads and writes a [`TileGrid`] with a seeded stream. It either
//! mutates the grid in place and returns `None`, or leaves it alone and
//! returns a freshly computed [`Grid`] for the caller to commit.
//!
//! [`EffectConfig`] describes any effect as data so generation pipelines can
//! be loaded from JSON.

mod area_stamp;
mod cellular_automata;
mod dungeon_rooms;
mod flood_fill;
mod majority_rules;
mod maze_growth;

use serde::{Deserialize, Serialize};

pub use area_stamp::{AreaStamp, Replace};
pub use cellular_automata::CellularAutomata;
pub use dungeon_rooms::DungeonRooms;
pub use flood_fill::FloodFill;
pub use majority_rules::MajorityRules;
pub use maze_growth::MazeGrowth;

use crate::grid::{Grid, TileGrid};
use crate::rng::RegionRng;

pub trait Effect {
    fn apply<G: TileGrid>(&self, data: &mut G, rng: &mut RegionRng) -> Option<Grid>;
}

/// Any effect, tagged by name.
///
/// ```json
/// { "effect": "flood_fill", "start": { "x": 0, "y": 0 }, "target": 0, "replace": 1 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum EffectConfig {
    AreaStamp(AreaStamp),
    CellularAutomata(CellularAutomata),
    MajorityRules,
    FloodFill(FloodFill),
    MazeGrowth(MazeGrowth),
    DungeonRooms(DungeonRooms),
}

impl EffectConfig {
    pub fn name(&self) -> &'static str {
        match self {
            EffectConfig::AreaStamp(_) => "area_stamp",
            EffectConfig::CellularAutomata(_) => "cellular_automata",
            EffectConfig::MajorityRules => "majority_rules",
            EffectConfig::FloodFill(_) => "flood_fill",
            EffectConfig::MazeGrowth(_) => "maze_growth",
            EffectConfig::DungeonRooms(_) => "dungeon_rooms",
        }
    }
}

impl Effect for EffectConfig {
    fn apply<G: TileGrid>(&self, data: &mut G, rng: &mut RegionRng) -> Option<Grid> {
        match self {
            EffectConfig::AreaStamp(e) => e.apply(data, rng),
            EffectConfig::CellularAutomata(e) => e.apply(data, rng),
            EffectConfig::MajorityRules => MajorityRules.apply(data, rng),
            EffectConfig::FloodFill(e) => e.apply(data, rng),
            EffectConfig::MazeGrowth(e) => e.apply(data, rng),
            EffectConfig::DungeonRooms(e) => e.apply(data, rng),
        }
    }
}

impl<E: Effect> Effect for &E {
    fn apply<G: TileGrid>(&self, data: &mut G, rng: &mut RegionRng) -> Option<Grid> {
        (**self).apply(data, rng)
    }
}
