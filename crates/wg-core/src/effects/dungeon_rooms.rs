//! Rooms-and-mazes dungeon generation
//!
//! The dungeon is built on a scratch grid of area labels, where label 0 is
//! solid rock:
//! 1. Stamp rooms on the odd sub-lattice, one label per room
//! 2. Fill the remaining odd cells with mazes, one label per maze
//! 3. Collect connectors: rock cells with two different labels on either
//!    side along exactly one axis
//! 4. Open random connectors, merging the two labels, until one remains;
//!    stale connectors may still be opened as extra loops
//! 5. Turn labels into `floor` and rock into `wall`
//! 6. Trim dead-end corridors back to the nearest junction

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::{AreaStamp, Effect, FloodFill, MazeGrowth, Replace};
use crate::consts::{
    DEFAULT_MAX_ROOM_SIZE, DEFAULT_MIN_ROOM_SIZE, DEFAULT_ROOM_ATTEMPTS, DEFAULT_RUN_FACTOR,
};
use crate::direction::Direction;
use crate::grid::{Grid, TileGrid, TileId};
use crate::pattern::{PatternCell, PatternMatcher};
use crate::position::Position;
use crate::rng::RegionRng;

/// Label of unassigned rock in the scratch grid.
const ROCK: TileId = 0;

/// Rooms-and-mazes dungeon over the whole segment.
///
/// Areas live on odd coordinates, so row and column 0 are always wall. The
/// east and south borders are wall only for odd sizes; with an even size
/// the last row and column are odd and can hold floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonRooms {
    pub wall: TileId,
    pub floor: TileId,
    #[serde(default = "default_min_room_size")]
    pub min_room_size: usize,
    #[serde(default = "default_max_room_size")]
    pub max_room_size: usize,
    #[serde(default = "default_room_attempts")]
    pub room_attempts: u32,
    /// Chance of opening a connector whose sides are already joined.
    #[serde(default)]
    pub connectivity: f64,
    #[serde(default = "default_run_factor")]
    pub run_factor: f64,
}

fn default_min_room_size() -> usize {
    DEFAULT_MIN_ROOM_SIZE
}

fn default_max_room_size() -> usize {
    DEFAULT_MAX_ROOM_SIZE
}

fn default_room_attempts() -> u32 {
    DEFAULT_ROOM_ATTEMPTS
}

fn default_run_factor() -> f64 {
    DEFAULT_RUN_FACTOR
}

impl DungeonRooms {
    pub fn new(wall: TileId, floor: TileId) -> Self {
        Self {
            wall,
            floor,
            min_room_size: DEFAULT_MIN_ROOM_SIZE,
            max_room_size: DEFAULT_MAX_ROOM_SIZE,
            room_attempts: DEFAULT_ROOM_ATTEMPTS,
            connectivity: 0.0,
            run_factor: DEFAULT_RUN_FACTOR,
        }
    }

    pub fn room_size(mut self, min: usize, max: usize) -> Self {
        self.min_room_size = min;
        self.max_room_size = max;
        self
    }

    pub fn room_attempts(mut self, attempts: u32) -> Self {
        self.room_attempts = attempts;
        self
    }

    pub fn connectivity(mut self, connectivity: f64) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn run_factor(mut self, run_factor: f64) -> Self {
        self.run_factor = run_factor;
        self
    }

    /// Steps 1 and 2. Returns the label grid and the number of labels used.
    fn carve_areas(&self, size: usize, rng: &mut RegionRng) -> (Grid, TileId) {
        let mut labels = Grid::new(size, ROCK);

        let mut next_label: TileId = 1;
        let rooms = AreaStamp::new(
            ROCK,
            Replace::Ascending { from: 1 },
            self.min_room_size,
            self.max_room_size,
        )
        .step(2)
        .attempts(self.room_attempts);
        rooms.stamp_with(&mut labels, rng, || {
            let label = next_label;
            next_label += 1;
            label
        });
        let room_count = next_label - 1;

        for x in (1..size as i32).step_by(2) {
            for y in (1..size as i32).step_by(2) {
                if labels.get(x, y) == Some(ROCK) {
                    MazeGrowth::new(Position::new(x, y), next_label)
                        .run_factor(self.run_factor)
                        .walkable([ROCK])
                        .apply(&mut labels, rng);
                    next_label += 1;
                }
            }
        }

        trace!(
            rooms = room_count,
            mazes = next_label - 1 - room_count,
            "dungeon areas carved"
        );
        (labels, next_label - 1)
    }

    /// Steps 1 to 4: a label grid where every area shares one label.
    fn merged_labels(&self, size: usize, rng: &mut RegionRng) -> Grid {
        let (mut labels, count) = self.carve_areas(size, rng);
        let mut remaining = count;
        let mut connectors = find_connectors(&labels);

        while remaining > 1 {
            if connectors.is_empty() {
                warn!(remaining, "dungeon ran out of connectors before joining every area");
                break;
            }
            let (x, y) = connectors.remove(rng.below(connectors.len()));

            if let Some((lower, upper)) = connector_labels(&labels, x, y) {
                labels.set(x, y, lower);
                FloodFill::new(Position::new(x, y), lower, upper).apply(&mut labels, rng);
                remaining -= 1;
            } else if let Some(label) = loop_label(&labels, x, y) {
                if rng.chance(self.connectivity) {
                    labels.set(x, y, label);
                }
            }
        }

        labels
    }

    fn dead_end_matchers(&self) -> Vec<(Direction, PatternMatcher)> {
        [Direction::West, Direction::East, Direction::South, Direction::North]
            .into_iter()
            .filter_map(|exit| {
                let template = dead_end_template(exit, self.wall, self.floor);
                PatternMatcher::new(&template).ok().map(|m| (exit, m))
            })
            .collect()
    }

    /// Step 6. Seal every dead end and follow its corridor while the next
    /// cell is a dead end too.
    fn trim_dead_ends(&self, tiles: &mut Grid) {
        let matchers = self.dead_end_matchers();
        let found = tiles.match_patterns(&matchers);
        let mut sealed = 0usize;

        for dead_end in found {
            tiles.set(dead_end.x, dead_end.y, self.wall);
            sealed += 1;

            let (dx, dy) = dead_end.key.delta();
            let mut next = Some((dead_end.x + dx, dead_end.y + dy));
            while let Some((x, y)) = next.take() {
                let grid: &Grid = tiles;
                if let Some((exit, _)) = matchers.iter().find(|(_, m)| m.matches(grid, x, y)) {
                    let (dx, dy) = exit.delta();
                    tiles.set(x, y, self.wall);
                    sealed += 1;
                    next = Some((x + dx, y + dy));
                }
            }
        }

        trace!(sealed, "dead ends trimmed");
    }
}

impl Effect for DungeonRooms {
    fn apply<G: TileGrid>(&self, data: &mut G, rng: &mut RegionRng) -> Option<Grid> {
        let labels = self.merged_labels(data.size(), rng);
        let mut tiles = labels.map(|label, _, _| if label == ROCK { self.wall } else { self.floor });
        self.trim_dead_ends(&mut tiles);
        Some(tiles)
    }
}

/// Rock cells inside the border that currently separate two areas.
fn find_connectors(labels: &Grid) -> Vec<(i32, i32)> {
    let size = labels.size() as i32;
    let mut connectors = Vec::new();
    for x in 1..size - 1 {
        for y in 1..size - 1 {
            if connector_labels(labels, x, y).is_some() {
                connectors.push((x, y));
            }
        }
    }
    connectors
}

/// Two different, non-rock labels on opposite sides of `(x, y)`.
fn split_pair(a: Option<TileId>, b: Option<TileId>) -> Option<(TileId, TileId)> {
    match (a, b) {
        (Some(a), Some(b)) if a != b && a != ROCK && b != ROCK => Some((a.min(b), a.max(b))),
        _ => None,
    }
}

/// If `(x, y)` is rock joining two areas along exactly one axis, return
/// their labels, smaller first.
fn connector_labels(labels: &Grid, x: i32, y: i32) -> Option<(TileId, TileId)> {
    if labels.get(x, y) != Some(ROCK) {
        return None;
    }
    let along_x = split_pair(labels.get(x - 1, y), labels.get(x + 1, y));
    let along_y = split_pair(labels.get(x, y - 1), labels.get(x, y + 1));
    match (along_x, along_y) {
        (Some(pair), None) | (None, Some(pair)) => Some(pair),
        _ => None,
    }
}

/// Label to open `(x, y)` with as an extra loop: both axes pair up and a
/// single area touches the cell.
fn loop_label(labels: &Grid, x: i32, y: i32) -> Option<TileId> {
    if labels.get(x, y) != Some(ROCK) {
        return None;
    }
    let (west, east) = (labels.get(x - 1, y), labels.get(x + 1, y));
    let (north, south) = (labels.get(x, y - 1), labels.get(x, y + 1));
    if west != east || north != south {
        return None;
    }
    match (west, north) {
        (Some(a), Some(b)) if a == b && a != ROCK => Some(a),
        (Some(a), Some(ROCK)) if a != ROCK => Some(a),
        (Some(ROCK), Some(b)) if b != ROCK => Some(b),
        _ => None,
    }
}

/// 3x3 template of a floor cell whose only open neighbor is `exit`.
fn dead_end_template(exit: Direction, wall: TileId, floor: TileId) -> Vec<Vec<PatternCell>> {
    let mut template = vec![vec![PatternCell::Any; 3]; 3];
    template[1][1] = PatternCell::Exact(floor);
    for dir in Direction::cardinals() {
        let (dx, dy) = dir.delta();
        let value = if dir == exit { floor } else { wall };
        template[(1 + dx) as usize][(1 + dy) as usize] = PatternCell::Exact(value);
    }
    template
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashSet, VecDeque};

    fn distinct_labels(grid: &Grid) -> HashSet<TileId> {
        grid.cells().iter().copied().filter(|&v| v != ROCK).collect()
    }

    fn floor_is_connected(grid: &Grid, floor: TileId) -> bool {
        let size = grid.size() as i32;
        let floors: Vec<(i32, i32)> = (0..size)
            .flat_map(|x| (0..size).map(move |y| (x, y)))
            .filter(|&(x, y)| grid.get(x, y) == Some(floor))
            .collect();
        let Some(&first) = floors.first() else {
            return true;
        };
        let mut seen = HashSet::from([first]);
        let mut queue = VecDeque::from([first]);
        while let Some((x, y)) = queue.pop_front() {
            for dir in Direction::cardinals() {
                let (dx, dy) = dir.delta();
                let next = (x + dx, y + dy);
                if grid.get(next.0, next.1) == Some(floor) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen.len() == floors.len()
    }

    #[test]
    fn test_merging_leaves_one_label() {
        let dungeon = DungeonRooms::new(1, 2);
        for seed in 0..8 {
            let mut rng = RegionRng::new(seed);
            let labels = dungeon.merged_labels(31, &mut rng);
            assert_eq!(distinct_labels(&labels).len(), 1, "seed {seed}");
        }
    }

    #[test]
    fn test_carve_fills_every_odd_cell() {
        let dungeon = DungeonRooms::new(1, 2);
        let mut rng = RegionRng::new(4);
        let (labels, count) = dungeon.carve_areas(21, &mut rng);
        for x in (1..21).step_by(2) {
            for y in (1..21).step_by(2) {
                assert_ne!(labels.get(x, y), Some(ROCK));
            }
        }
        assert_eq!(distinct_labels(&labels).len(), count as usize);
    }

    #[test]
    fn test_output_is_connected_wall_and_floor() {
        for seed in 0..8 {
            let dungeon = DungeonRooms::new(7, 3).connectivity(0.2);
            let mut grid = Grid::new(32, 0);
            let mut rng = RegionRng::new(seed);
            let tiles = dungeon.apply(&mut grid, &mut rng).unwrap();
            assert!(tiles.cells().iter().all(|&v| v == 7 || v == 3));
            assert!(floor_is_connected(&tiles, 3), "seed {seed}");
            // the west and north borders never open
            for i in 0..32 {
                assert_eq!(tiles.get(0, i), Some(7));
                assert_eq!(tiles.get(i, 0), Some(7));
            }
        }
    }

    #[test]
    fn test_border_parity() {
        let dungeon = DungeonRooms::new(7, 3);
        let run = |size: usize, seed| {
            let mut grid = Grid::new(size, 0);
            let mut rng = RegionRng::new(seed);
            dungeon.apply(&mut grid, &mut rng).unwrap()
        };

        for seed in 0..8 {
            let tiles = run(31, seed);
            for i in 0..31 {
                assert_eq!(tiles.get(0, i), Some(7), "seed {seed}");
                assert_eq!(tiles.get(i, 0), Some(7), "seed {seed}");
                assert_eq!(tiles.get(30, i), Some(7), "seed {seed}");
                assert_eq!(tiles.get(i, 30), Some(7), "seed {seed}");
            }
        }

        // Even sizes put the last column and row on the odd lattice.
        let mut rng = RegionRng::new(0);
        let (labels, _) = dungeon.carve_areas(32, &mut rng);
        for i in (1..32).step_by(2) {
            assert_ne!(labels.get(31, i), Some(ROCK));
            assert_ne!(labels.get(i, 31), Some(ROCK));
        }
    }

    #[test]
    fn test_no_dead_ends_survive_trimming() {
        let dungeon = DungeonRooms::new(1, 2);
        let mut grid = Grid::new(31, 0);
        let mut rng = RegionRng::new(17);
        let tiles = dungeon.apply(&mut grid, &mut rng).unwrap();
        let matchers = dungeon.dead_end_matchers();
        assert!(tiles.match_patterns(&matchers).is_empty());
    }

    #[test]
    fn test_same_seed_same_dungeon() {
        let dungeon = DungeonRooms::new(1, 2);
        let run = |seed| {
            let mut grid = Grid::new(25, 0);
            let mut rng = RegionRng::new(seed);
            dungeon.apply(&mut grid, &mut rng)
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_connector_needs_two_distinct_areas() {
        let labels = Grid::from_rows(&[vec![0, 1, 0], vec![0, 0, 0], vec![0, 2, 0]]);
        assert_eq!(connector_labels(&labels, 1, 1), Some((1, 2)));
        let same = Grid::from_rows(&[vec![0, 1, 0], vec![0, 0, 0], vec![0, 1, 0]]);
        assert_eq!(connector_labels(&same, 1, 1), None);
        assert_eq!(loop_label(&same, 1, 1), Some(1));
    }

    #[test]
    fn test_dead_end_template_layout() {
        let template = dead_end_template(Direction::West, 1, 2);
        assert_eq!(template[0][1], PatternCell::Exact(2));
        assert_eq!(template[2][1], PatternCell::Exact(1));
        assert_eq!(template[1][0], PatternCell::Exact(1));
        assert_eq!(template[1][2], PatternCell::Exact(1));
        assert_eq!(template[0][0], PatternCell::Any);
    }
}
