//! Loop Level -- tile-map loading on top of [`loop_ecs`].
//!
//! Parses Tiled-style JSON maps and spawns one entity per non-empty tile,
//! each carrying a [`TileTag`](components::TileTag), a
//! [`Sprite`](components::Sprite) and a [`Body`](components::Body).
//!
//! ```
//! use loop_ecs::prelude::*;
//! use loop_level::prelude::*;
//!
//! let map = TileMap::from_json_str(r#"{
//!     "tilewidth": 16, "tileheight": 16, "width": 2, "height": 1,
//!     "layers": [{ "name": "ground", "data": [3, 0] }]
//! }"#).unwrap();
//!
//! let mut world = World::new();
//! let tiles = load_map(&mut world, &map, &LevelConfig::default()).unwrap();
//!
//! assert_eq!(get_entities2::<TileTag, Body>(&world), tiles);
//! ```

#![deny(unsafe_code)]

use std::path::PathBuf;

pub mod components;
pub mod loader;
pub mod map;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while reading or loading a tile map.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// The map file could not be read.
    #[error("failed to read map {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The map file is not valid JSON or does not match the map schema.
    #[error("failed to parse map: {0}")]
    Parse(#[from] serde_json::Error),

    /// Tiles must have a non-zero size.
    #[error("invalid tile size {width}x{height}")]
    InvalidTileSize {
        width: u32,
        height: u32,
    },

    /// A layer's data does not cover the whole map.
    #[error("layer {layer} has {actual} tiles, expected {expected}")]
    LayerSizeMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    /// The configured layer does not exist.
    #[error("map has no layer {index} ({available} available)")]
    MissingLayer {
        index: usize,
        available: usize,
    },

    /// Not even one tile fits in the tileset texture.
    #[error(
        "tileset of {tileset_width}x{tileset_height} px cannot hold {tile_width}x{tile_height} tiles"
    )]
    TilesetTooSmall {
        tileset_width: f64,
        tileset_height: f64,
        tile_width: u32,
        tile_height: u32,
    },

    /// A tile id points past the end of the tileset.
    #[error("tile id {id} is outside the tileset ({capacity} tiles)")]
    TileOutOfRange {
        id: u32,
        capacity: u64,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::components::{Body, Rect, Sprite, TileTag, Vec2};
    pub use crate::loader::{load_map, load_map_from_path, register_level_components, LevelConfig};
    pub use crate::map::{TileLayer, TileMap};
    pub use crate::LevelError;
}
