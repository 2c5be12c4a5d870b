use std::collections::VecDeque;

use wg_core::effects::{DungeonRooms, Effect, FloodFill};
use wg_core::world::{WorldOptions, load_snapshot};
use wg_core::{Area, Grid, Position, RegionType, TileGrid, TileId, World, WorldBuilder};

const WALL: TileId = 1;
const FLOOR: TileId = 2;

const MIXED: &str = r#"{
    "seed": "determinism",
    "region_size": 11,
    "region_types": [
        { "name": "cave", "weight": 2,
          "fill": [{ "value": 1, "weight": 45 }, { "value": 2, "weight": 55 }] },
        { "name": "dungeon",
          "init": { "effect": "dungeon_rooms", "wall": 1, "floor": 2,
                    "min_room_size": 3, "max_room_size": 5, "room_attempts": 10 } }
    ],
    "generation": [
        { "select": ["cave"], "times": 3,
          "apply": { "effect": "cellular_automata", "born": 5, "survive": 4, "live": 1, "dead": 2 } },
        { "apply": { "effect": "majority_rules" } }
    ]
}"#;

fn mixed_world() -> World {
    WorldOptions::parse(MIXED)
        .unwrap()
        .into_builder()
        .build()
        .unwrap()
}

/// Tiles of every region in `area`, in area order.
fn tiles(world: &World, area: Area) -> Vec<Option<Grid>> {
    area.positions()
        .map(|p| world.region(p).map(|r| r.data.grid().clone()))
        .collect()
}

fn floor_is_connected(grid: &Grid) -> bool {
    let size = grid.size() as i32;
    let floor: Vec<(i32, i32)> = (0..size)
        .flat_map(|x| (0..size).map(move |y| (x, y)))
        .filter(|&(x, y)| grid.get(x, y) == Some(FLOOR))
        .collect();
    let Some(&start) = floor.first() else {
        return true;
    };

    let mut seen = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
            let next = (x + dx, y + dy);
            if grid.get(next.0, next.1) == Some(FLOOR) && !seen.contains(&next) {
                seen.push(next);
                queue.push_back(next);
            }
        }
    }
    seen.len() == floor.len()
}

#[test]
fn test_same_seed_same_world() {
    let area = Position::ORIGIN.neighborhood();
    let mut a = mixed_world();
    let mut b = mixed_world();
    a.generate(area).unwrap();
    b.generate(area).unwrap();
    assert_eq!(tiles(&a, area), tiles(&b, area));
    for position in area.positions() {
        assert_eq!(
            a.region(position).map(|r| (&r.region_type, r.seed)),
            b.region(position).map(|r| (&r.region_type, r.seed))
        );
    }
}

#[test]
fn test_different_seed_different_world() {
    let area = Position::ORIGIN.neighborhood();
    let mut options = WorldOptions::parse(MIXED).unwrap();
    options.seed = wg_core::world::options::SeedOption::Name("other".into());
    let mut a = mixed_world();
    let mut b = options.into_builder().build().unwrap();
    a.generate(area).unwrap();
    b.generate(area).unwrap();
    assert_ne!(tiles(&a, area), tiles(&b, area));
}

#[test]
fn test_regenerate_reproduces_tiles() {
    let area = Position::ORIGIN.neighborhood();
    let mut world = mixed_world();
    world.generate(area).unwrap();
    let first = tiles(&world, area);
    world.regenerate(area).unwrap();
    assert_eq!(tiles(&world, area), first);
}

#[test]
fn test_evicted_region_comes_back_identical() {
    let mut world = mixed_world();
    let position = Position::new(1, -1);
    let before = world.region(position).unwrap().data.grid().clone();
    world.remove(Area::single(position));
    assert_eq!(world.len(), 8);
    world.move_east().unwrap();
    let after = world.region(position).unwrap().data.grid().clone();
    assert_eq!(before, after);
}

#[test]
fn test_snapshot_restores_tiles_and_edits() {
    let area = Position::ORIGIN.neighborhood();
    let mut world = mixed_world();
    assert!(world.mutate(Position::ORIGIN, 3, 4, 7));
    world.generate(area).unwrap();
    // materialize a row beyond the generated area, then return
    world.move_south().unwrap();
    world.move_north().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.json");
    world.save(&path).unwrap();

    let snapshot = load_snapshot(&path).unwrap();
    assert_eq!(snapshot.records().count(), 12);
    let mut restored = WorldOptions::parse(MIXED)
        .unwrap()
        .into_builder()
        .restore(snapshot)
        .build()
        .unwrap();
    restored.generate(area).unwrap();

    assert_eq!(tiles(&restored, area), tiles(&world, area));
    assert_eq!(
        restored.region(Position::ORIGIN).unwrap().data.get(3, 4),
        Some(7)
    );

    let south = Area::new(Position::new(-1, 2), Position::new(1, 2));
    restored.materialize(south).unwrap();
    assert_eq!(tiles(&restored, south), tiles(&world, south));
}

#[test]
fn test_dungeon_region_is_walled_and_connected() {
    for seed in 0..8u64 {
        let world = WorldBuilder::new(seed)
            .region_size(21)
            .region_type(RegionType::new("dungeon").init(|view, rng| {
                DungeonRooms::new(WALL, FLOOR)
                    .room_size(3, 7)
                    .room_attempts(30)
                    .apply(view, rng)
            }))
            .build()
            .unwrap();

        for region in world.regions() {
            let grid = region.data.grid();
            assert!(grid.cells().iter().all(|&t| t == WALL || t == FLOOR));
            assert!(grid.count(FLOOR) > 0);
            for i in 0..21 {
                assert_eq!(grid.get(0, i), Some(WALL));
                assert_eq!(grid.get(i, 0), Some(WALL));
                assert_eq!(grid.get(20, i), Some(WALL));
                assert_eq!(grid.get(i, 20), Some(WALL));
            }
            assert!(floor_is_connected(grid), "seed {seed} at {:?}", region.position);
        }
    }
}

#[test]
fn test_flood_fill_crosses_region_boundaries() {
    let mut world = WorldBuilder::new(5u64)
        .region_size(4)
        .region_type(RegionType::new("blank"))
        .build()
        .unwrap();

    world
        .generate_with(Area::single(Position::ORIGIN), |generator| {
            generator.apply(|_| FloodFill::new(Position::ORIGIN, 0, 5));
            Ok(())
        })
        .unwrap();

    // the fill starts in the origin region but reaches the whole neighborhood
    for region in world.regions() {
        assert_eq!(region.data.grid().count(5), 16, "{:?}", region.position);
    }
}

#[test]
fn test_selection_limits_effects_to_type() {
    let mut world = mixed_world();
    let area = Position::ORIGIN.neighborhood();
    let dungeons_before: Vec<_> = world
        .regions()
        .filter(|r| r.region_type == "dungeon")
        .map(|r| (r.position, r.data.grid().clone()))
        .collect();

    world
        .generate_with(area, |generator| {
            generator.select(&["cave"])?;
            generator.apply(|_| wg_core::effects::CellularAutomata::new(0, 0, 9, 9));
            Ok(())
        })
        .unwrap();

    for (position, grid) in dungeons_before {
        assert_eq!(world.region(position).unwrap().data.grid(), &grid);
    }
    for region in world.regions().filter(|r| r.region_type == "cave") {
        assert_eq!(region.data.grid().count(9), 121);
    }
}
