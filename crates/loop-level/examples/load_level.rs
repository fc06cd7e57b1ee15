//! Load a tile map and run a couple of frames of a falling-body system
//! against it.
//!
//! Run with:
//!   cargo run --example load_level -p loop-level [-- path/to/map.json]
//!
//! Set `RUST_LOG=debug` to see component registration and despawns.

use anyhow::Context;
use loop_ecs::prelude::*;
use loop_level::prelude::*;
use tracing_subscriber::EnvFilter;

const DEMO_MAP: &str = r#"{
    "tilewidth": 16,
    "tileheight": 16,
    "width": 6,
    "height": 4,
    "layers": [
        { "name": "ground", "data": [0, 0, 0, 0, 0, 0,
                                     0, 0, 0, 0, 0, 0,
                                     0, 0, 4, 4, 0, 0,
                                     1, 1, 1, 1, 1, 1] }
    ]
}"#;

/// Downward speed in pixels per frame.
#[derive(Debug, Default, Clone, Copy)]
struct Falling(f64);

/// Move every falling body down until it rests on a tile.
fn gravity_system(world: &mut World) {
    let tiles: Vec<Rect> = get_entities2::<TileTag, Body>(world)
        .into_iter()
        .filter_map(|e| world.get_component::<Body>(e).ok().map(Body::bounds))
        .collect();

    for e in get_entities2::<Falling, Body>(world) {
        let Ok(&Falling(speed)) = world.get_component::<Falling>(e) else {
            continue;
        };
        let Ok(body) = world.get_component_mut::<Body>(e) else {
            continue;
        };
        let feet = Vec2::new(body.position.x, body.position.y + body.size.y + speed);
        if tiles.iter().any(|tile| tile.contains(feet)) {
            world.remove_component::<Falling>(e);
            tracing::info!(entity = %e, "landed");
        } else {
            body.position.y += speed;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let map = match std::env::args().nth(1) {
        Some(path) => TileMap::from_path(&path).with_context(|| format!("loading {path}"))?,
        None => TileMap::from_json_str(DEMO_MAP).context("parsing built-in map")?,
    };

    let mut world = World::new();
    world.register_component::<Falling>();
    let tiles = load_map(&mut world, &map, &LevelConfig::default())?;

    let crate_entity = world.new_entity();
    world.insert_component(
        crate_entity,
        Body::new(Vec2::new(34.0, 0.0), Vec2::new(8.0, 8.0)),
    );
    world.add_component::<Falling>(crate_entity).0 = 2.0;

    for frame in 0..30 {
        gravity_system(&mut world);
        if !world.has_component::<Falling>(crate_entity) {
            tracing::info!(frame, "simulation settled");
            break;
        }
    }

    let body = world.get_component::<Body>(crate_entity)?;
    tracing::info!(
        tiles = tiles.len(),
        x = body.position.x,
        y = body.position.y,
        "final crate position"
    );
    Ok(())
}
