//! Turn a [`TileMap`] into tile entities.
//!
//! The loader is an ordinary client of the ECS: for every non-empty tile it
//! creates an entity and attaches a [`TileTag`], a [`Sprite`] cut from the
//! tileset and a [`Body`] covering the tile.

use std::path::Path;

use loop_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::components::{Body, Rect, Sprite, TileTag, Vec2};
use crate::map::TileMap;
use crate::LevelError;

// ---------------------------------------------------------------------------
// LevelConfig
// ---------------------------------------------------------------------------

/// How to interpret a map when loading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Texture path recorded on every tile sprite.
    pub tileset_path: String,
    /// Tileset texture size in pixels. Decides how many tiles fit per row.
    pub tileset_size: Vec2,
    /// Index of the map layer to load.
    pub layer: usize,
}

impl Default for LevelConfig {
    /// The grass tileset: 256x256 px, first layer.
    fn default() -> Self {
        Self {
            tileset_path: "assets/res/GrassTiles.png".to_owned(),
            tileset_size: Vec2::new(256.0, 256.0),
            layer: 0,
        }
    }
}

/// Tileset grid geometry derived from the config and the map's tile size.
#[derive(Debug, Clone, Copy)]
struct TilesetGrid {
    columns: u32,
    rows: u32,
}

impl TilesetGrid {
    fn new(map: &TileMap, config: &LevelConfig) -> Result<Self, LevelError> {
        let columns = config.tileset_size.x.max(0.0) as u32 / map.tile_width;
        let rows = config.tileset_size.y.max(0.0) as u32 / map.tile_height;
        if columns == 0 || rows == 0 {
            return Err(LevelError::TilesetTooSmall {
                tileset_width: config.tileset_size.x,
                tileset_height: config.tileset_size.y,
                tile_width: map.tile_width,
                tile_height: map.tile_height,
            });
        }
        Ok(Self { columns, rows })
    }

    fn capacity(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }

    /// Source rectangle for a (1-based) tile id.
    fn source(&self, id: u32, tile_size: Vec2) -> Rect {
        let index = id - 1;
        let column = index % self.columns;
        let row = index / self.columns;
        Rect::new(
            Vec2::new(column as f64 * tile_size.x, row as f64 * tile_size.y),
            tile_size,
        )
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Register the tile component types that are not registered yet.
pub fn register_level_components(world: &mut World) {
    if !world.is_registered::<TileTag>() {
        world.register_component::<TileTag>();
    }
    if !world.is_registered::<Sprite>() {
        world.register_component::<Sprite>();
    }
    if !world.is_registered::<Body>() {
        world.register_component::<Body>();
    }
}

/// Create one entity per non-empty tile of the configured layer.
///
/// Every tile id is checked against the tileset before anything is spawned,
/// so a failed load leaves the world untouched. Returns the new entities in
/// row-major tile order.
pub fn load_map(
    world: &mut World,
    map: &TileMap,
    config: &LevelConfig,
) -> Result<Vec<Entity>, LevelError> {
    map.validate()?;
    let layer = map.tile_layer(config.layer)?;
    let grid = TilesetGrid::new(map, config)?;

    if let Some((_, _, id)) = map
        .tiles(layer)
        .find(|(_, _, id)| u64::from(*id) > grid.capacity())
    {
        return Err(LevelError::TileOutOfRange {
            id,
            capacity: grid.capacity(),
        });
    }

    register_level_components(world);

    let tile_size = Vec2::new(f64::from(map.tile_width), f64::from(map.tile_height));
    let mut spawned = Vec::new();
    for (column, row, id) in map.tiles(layer) {
        let position = Vec2::new(f64::from(column) * tile_size.x, f64::from(row) * tile_size.y);

        let entity = world.new_entity();
        world.add_component::<TileTag>(entity);
        *world.add_component::<Sprite>(entity) = Sprite {
            texture: config.tileset_path.clone(),
            source: grid.source(id, tile_size),
            destination: Rect::new(position, tile_size),
        };
        *world.add_component::<Body>(entity) = Body::new(position, tile_size);
        spawned.push(entity);
    }

    debug!(columns = grid.columns, rows = grid.rows, "tileset grid");
    info!(
        tiles = spawned.len(),
        layer = %layer.name,
        width = map.width,
        height = map.height,
        "loaded tile map"
    );
    Ok(spawned)
}

/// Read a map file and load it into `world`.
pub fn load_map_from_path(
    world: &mut World,
    path: impl AsRef<Path>,
    config: &LevelConfig,
) -> Result<Vec<Entity>, LevelError> {
    let map = TileMap::from_path(path)?;
    load_map(world, &map, config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn map(width: u32, height: u32, data: Vec<u32>) -> TileMap {
        TileMap {
            tile_width: 16,
            tile_height: 16,
            width,
            height,
            layers: vec![crate::map::TileLayer {
                name: "ground".to_owned(),
                data,
            }],
        }
    }

    fn config(tileset_px: f64) -> LevelConfig {
        LevelConfig {
            tileset_size: Vec2::new(tileset_px, tileset_px),
            ..Default::default()
        }
    }

    #[test]
    fn source_rect_walks_tileset_rows() {
        let grid = TilesetGrid { columns: 4, rows: 4 };
        let size = Vec2::new(16.0, 16.0);
        assert_eq!(grid.source(1, size).position, Vec2::new(0.0, 0.0));
        assert_eq!(grid.source(4, size).position, Vec2::new(48.0, 0.0));
        assert_eq!(grid.source(5, size).position, Vec2::new(0.0, 16.0));
        assert_eq!(grid.source(16, size).position, Vec2::new(48.0, 48.0));
    }

    #[test]
    fn uses_column_count_for_rows_on_wide_tilesets() {
        // 8 columns by 2 rows: id 9 starts the second row.
        let grid = TilesetGrid::new(
            &map(1, 1, vec![0]),
            &LevelConfig {
                tileset_size: Vec2::new(128.0, 32.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!((grid.columns, grid.rows), (8, 2));
        assert_eq!(
            grid.source(9, Vec2::new(16.0, 16.0)).position,
            Vec2::new(0.0, 16.0)
        );
    }

    #[test]
    fn spawns_one_entity_per_tile() {
        let mut world = World::new();
        let spawned = load_map(&mut world, &map(2, 2, vec![1, 0, 0, 6]), &config(64.0)).unwrap();
        assert_eq!(spawned.len(), 2);

        let second = world.get_component::<Sprite>(spawned[1]).unwrap();
        assert_eq!(second.source.position, Vec2::new(16.0, 16.0));
        assert_eq!(second.destination.position, Vec2::new(16.0, 16.0));
        assert_eq!(second.texture, "assets/res/GrassTiles.png");

        let body = world.get_component::<Body>(spawned[1]).unwrap();
        assert_eq!(*body, Body::new(Vec2::new(16.0, 16.0), Vec2::new(16.0, 16.0)));
    }

    #[test]
    fn out_of_range_tile_leaves_world_untouched() {
        let mut world = World::new();
        let err = load_map(&mut world, &map(2, 1, vec![1, 17]), &config(64.0)).unwrap_err();
        assert!(matches!(
            err,
            LevelError::TileOutOfRange {
                id: 17,
                capacity: 16
            }
        ));
        assert_eq!(world.size(), 0);
    }

    #[test]
    fn huge_tileset_with_tiny_tiles_loads() {
        let mut tiny = map(2, 1, vec![1, u32::MAX]);
        tiny.tile_width = 1;
        tiny.tile_height = 1;
        let mut world = World::new();

        let spawned = load_map(&mut world, &tiny, &config(70_000.0)).unwrap();

        assert_eq!(spawned.len(), 2);
        let last = world.get_component::<Sprite>(spawned[1]).unwrap();
        let index = u32::MAX - 1;
        assert_eq!(
            last.source.position,
            Vec2::new(f64::from(index % 70_000), f64::from(index / 70_000))
        );
    }

    #[test]
    fn object_layer_mixed_with_tiles_loads_tile_layer() {
        let json = r#"{
            "tilewidth": 16, "tileheight": 16, "width": 2, "height": 1,
            "layers": [
                { "name": "ground", "type": "tilelayer", "data": [2, 3] },
                { "name": "spawns", "type": "objectgroup", "objects": [] }
            ]
        }"#;
        let map = TileMap::from_json_str(json).unwrap();
        let mut world = World::new();

        assert_eq!(load_map(&mut world, &map, &config(64.0)).unwrap().len(), 2);

        let objects = LevelConfig {
            layer: 1,
            ..config(64.0)
        };
        assert!(matches!(
            load_map(&mut world, &map, &objects),
            Err(LevelError::LayerSizeMismatch { layer: 1, .. })
        ));
        assert_eq!(world.size(), 2);
    }

    #[test]
    fn tileset_smaller_than_a_tile_is_rejected() {
        let mut world = World::new();
        assert!(matches!(
            load_map(&mut world, &map(1, 1, vec![1]), &config(8.0)),
            Err(LevelError::TilesetTooSmall { .. })
        ));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: LevelConfig = serde_json::from_str(r#"{ "layer": 2 }"#).unwrap();
        assert_eq!(config.layer, 2);
        assert_eq!(config.tileset_size, Vec2::new(256.0, 256.0));
    }
}
