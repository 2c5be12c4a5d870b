//! Generate a patch of world around the origin and print it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use wg_core::render::{default_glyph, render_area};
use wg_core::world::options::SeedOption;
use wg_core::world::{WorldOptions, load_snapshot};
use wg_core::{Area, Position};

/// Built-in world used when no configuration file is given.
const DEFAULT_OPTIONS: &str = r#"{
    "seed": 0,
    "region_size": 25,
    "region_types": [
        { "name": "cave", "weight": 3,
          "fill": [{ "value": 1, "weight": 45 }, { "value": 2, "weight": 55 }] },
        { "name": "dungeon", "weight": 1,
          "init": { "effect": "dungeon_rooms", "wall": 1, "floor": 2,
                    "min_room_size": 3, "max_room_size": 7, "room_attempts": 20 } }
    ],
    "generation": [
        { "select": ["cave"], "times": 4,
          "apply": { "effect": "cellular_automata", "born": 5, "survive": 4, "live": 1, "dead": 2 } },
        { "select": ["cave"],
          "apply": { "effect": "majority_rules" } }
    ]
}"#;

/// Seeded region world generator
#[derive(Parser, Debug)]
#[command(name = "worldgen")]
#[command(author, version, about = "Generate and print a tile world", long_about = None)]
struct Args {
    /// World configuration (JSON)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Seed override, numeric or a name
    #[arg(short = 's', long = "seed")]
    seed: Option<String>,

    /// Regions to generate on each side of the cursor
    #[arg(short = 'r', long = "radius", default_value_t = 1)]
    radius: u32,

    /// Restore a world from a snapshot before generating
    #[arg(short = 'l', long = "load")]
    load: Option<PathBuf>,

    /// Write a snapshot after generating
    #[arg(short = 'o', long = "save")]
    save: Option<PathBuf>,

    /// Skip the generation passes and print initialized regions only
    #[arg(long = "no-generate")]
    no_generate: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn parse_seed(raw: &str) -> SeedOption {
    match raw.parse::<u64>() {
        Ok(n) => SeedOption::Number(n),
        Err(_) => SeedOption::Name(raw.to_string()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut options = match &args.config {
        Some(path) => WorldOptions::load(path)
            .with_context(|| format!("failed to read options from {}", path.display()))?,
        None => WorldOptions::parse(DEFAULT_OPTIONS)?,
    };
    if let Some(seed) = &args.seed {
        options.seed = parse_seed(seed);
    }

    let mut builder = options.into_builder();
    if let Some(path) = &args.load {
        let snapshot = load_snapshot(path)
            .with_context(|| format!("failed to load snapshot {}", path.display()))?;
        info!(path = %path.display(), "restoring snapshot");
        builder = builder.restore(snapshot);
    }
    let mut world = builder.build()?;

    let area = Area::around(world.position(), args.radius);
    if args.no_generate {
        world.materialize(area)?;
    } else {
        world.generate(area)?;
    }
    let Position { x, y } = world.position();
    info!(
        seed = world.seed().value(),
        regions = world.len(),
        x,
        y,
        "world ready"
    );

    print!("{}", render_area(&world, area, default_glyph));

    if let Some(path) = &args.save {
        world
            .save(path)
            .with_context(|| format!("failed to save snapshot {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}
