//! World configuration files
//!
//! A world can be described entirely in JSON: seed, lattice shape, region
//! types with their fill tables and initializer effects, and a list of
//! generation steps.
//!
//! ```json
//! {
//!   "seed": "glacier",
//!   "region_size": 32,
//!   "region_types": [
//!     { "name": "cave", "weight": 3, "fill": [{ "value": 1, "weight": 45 }, { "value": 2, "weight": 55 }] },
//!     { "name": "dungeon", "init": { "effect": "dungeon_rooms", "wall": 1, "floor": 2 } }
//!   ],
//!   "generation": [
//!     { "select": ["cave"], "times": 4,
//!       "apply": { "effect": "cellular_automata", "born": 5, "survive": 4, "live": 1, "dead": 2 } }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{RegionType, WorldBuilder};
use crate::consts::DEFAULT_REGION_SIZE;
use crate::effects::{Effect, EffectConfig};
use crate::grid::{TileGrid, TileId};
use crate::position::Bounds;
use crate::rng::{Weighted, WeightedTable, WorldSeed};

/// Error type for option loading
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Seed given either as a number or as a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedOption {
    Number(u64),
    Name(String),
}

impl Default for SeedOption {
    fn default() -> Self {
        SeedOption::Number(0)
    }
}

impl SeedOption {
    pub fn world_seed(&self) -> WorldSeed {
        match self {
            SeedOption::Number(n) => WorldSeed::new(*n),
            SeedOption::Name(name) => WorldSeed::from_name(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTypeOptions {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Weighted tiles to randomize a fresh region with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Vec<Weighted<TileId>>>,
    /// Effect run after the fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<EffectConfig>,
}

fn default_weight() -> u32 {
    1
}

/// One generation step: narrow the selection, then apply an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStep {
    /// Region types to select; empty selects everything.
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(default = "default_times")]
    pub times: usize,
    pub apply: EffectConfig,
}

fn default_times() -> usize {
    1
}

fn default_region_size() -> usize {
    DEFAULT_REGION_SIZE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldOptions {
    #[serde(default)]
    pub seed: SeedOption,
    #[serde(default = "default_region_size")]
    pub region_size: usize,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub region_types: Vec<RegionTypeOptions>,
    #[serde(default)]
    pub generation: Vec<GenerationStep>,
}

impl WorldOptions {
    /// Load options from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse options from a JSON string
    pub fn parse(contents: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Turn the options into a builder. Validation happens in
    /// [`WorldBuilder::build`].
    pub fn into_builder(self) -> WorldBuilder {
        let mut builder = WorldBuilder::new(self.seed.world_seed())
            .region_size(self.region_size)
            .bounds(self.bounds);

        for options in self.region_types {
            builder = builder.region_type(options.into_region_type());
        }

        if !self.generation.is_empty() {
            let steps = self.generation;
            builder = builder.generation(move |generator| {
                for step in &steps {
                    if step.select.is_empty() {
                        generator.select_all();
                    } else {
                        generator.select(step.select.as_slice())?;
                    }
                    generator.apply_times(step.times, |_| &step.apply);
                }
                Ok(())
            });
        }

        builder
    }
}

impl RegionTypeOptions {
    fn into_region_type(self) -> RegionType {
        let region_type = RegionType::new(self.name).weight(self.weight);
        if self.fill.is_none() && self.init.is_none() {
            return region_type;
        }

        let fill = self.fill.map(WeightedTable::new);
        let init = self.init;
        region_type.init(move |view, rng| {
            if let Some(table) = &fill {
                view.randomize(table, rng);
            }
            init.as_ref().and_then(|effect| effect.apply(view, rng))
        })
    }
}
