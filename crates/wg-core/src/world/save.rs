//! World snapshots
//!
//! A snapshot stores what is needed to rebuild a world's tiles, not the
//! tiles themselves: the seed, the cursor, the lattice shape and one
//! [`RegionRecord`] per region ever materialized. Region types, initializers
//! and policies are code and must be supplied again on import.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::position::{Bounds, Position};
use crate::region::{NestedMutations, Region, RegionSeed};
use crate::rng::WorldSeed;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

const SNAPSHOT_MAGIC: &str = "WGSN";

/// Snapshot import/export errors
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot file not found")]
    NotFound,

    #[error("Invalid snapshot header")]
    InvalidHeader,

    #[error("Incompatible snapshot version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },
}

/// Everything needed to bring a region back exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    #[serde(rename = "type")]
    pub region_type: String,
    pub seed: RegionSeed,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mutations: NestedMutations,
}

impl RegionRecord {
    pub fn of(region: &Region) -> Self {
        Self {
            region_type: region.region_type.clone(),
            seed: region.seed,
            mutations: region.mutations.to_nested(),
        }
    }
}

/// Position-keyed records, nested `x -> y`.
pub type InitialData = BTreeMap<i32, BTreeMap<i32, RegionRecord>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    pub seed: WorldSeed,
    pub position: Position,
    pub bounds: Bounds,
    pub region_size: usize,
    pub initial_data: InitialData,
}

impl WorldSnapshot {
    /// Records flattened into position order.
    pub fn records(&self) -> impl Iterator<Item = (Position, &RegionRecord)> {
        self.initial_data.iter().flat_map(|(&x, column)| {
            column
                .iter()
                .map(move |(&y, record)| (Position::new(x, y), record))
        })
    }

    pub fn insert_record(&mut self, position: Position, record: RegionRecord) {
        self.initial_data
            .entry(position.x)
            .or_default()
            .insert(position.y, record);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotHeader {
    magic: String,
    version: u32,
}

impl SnapshotHeader {
    fn current() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC.to_string(),
            version: SNAPSHOT_VERSION,
        }
    }

    fn validate(&self) -> Result<(), SaveError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SaveError::InvalidHeader);
        }
        if self.version != SNAPSHOT_VERSION {
            return Err(SaveError::IncompatibleVersion {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    header: SnapshotHeader,
    world: WorldSnapshot,
}

/// Write a snapshot as pretty-printed JSON.
pub fn save_snapshot(snapshot: &WorldSnapshot, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let contents = SnapshotFile {
        header: SnapshotHeader::current(),
        world: snapshot.clone(),
    };
    serde_json::to_writer_pretty(writer, &contents)?;
    Ok(())
}

/// Read a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<WorldSnapshot, SaveError> {
    let file = File::open(path).map_err(|_| SaveError::NotFound)?;
    let reader = BufReader::new(file);
    let contents: SnapshotFile = serde_json::from_reader(reader)?;
    contents.header.validate()?;
    Ok(contents.world)
}
