//! Tiled-style JSON tile maps.
//!
//! Only the subset of the format the game uses is modelled: the tile size,
//! the layer size and a list of tile layers whose `data` is a row-major array
//! of tile ids, `0` meaning "no tile". Other layer kinds (object groups,
//! image layers) parse with empty `data` and are skipped by validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::LevelError;

/// One layer of tile ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    #[serde(default)]
    pub name: String,
    /// Row-major tile ids, `width * height` entries. `0` is empty.
    #[serde(default)]
    pub data: Vec<u32>,
}

/// A parsed tile map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    /// Width of one tile in pixels.
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    /// Height of one tile in pixels.
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    /// Layer width in tiles.
    pub width: u32,
    /// Layer height in tiles.
    pub height: u32,
    pub layers: Vec<TileLayer>,
}

impl TileMap {
    /// Parse a map from JSON text and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let map: TileMap = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Read, parse and validate a map file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check the invariants the loader relies on.
    ///
    /// Layers without tile data are not checked here; selecting one through
    /// [`tile_layer`](Self::tile_layer) reports it.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(LevelError::InvalidTileSize {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        for (index, layer) in self.layers.iter().enumerate() {
            if !layer.data.is_empty() {
                self.check_layer_size(index, layer)?;
            }
        }
        Ok(())
    }

    fn check_layer_size(&self, index: usize, layer: &TileLayer) -> Result<(), LevelError> {
        let expected = self.width as usize * self.height as usize;
        if layer.data.len() != expected {
            return Err(LevelError::LayerSizeMismatch {
                layer: index,
                expected,
                actual: layer.data.len(),
            });
        }
        Ok(())
    }

    /// The layer at `index`.
    pub fn layer(&self, index: usize) -> Result<&TileLayer, LevelError> {
        self.layers.get(index).ok_or(LevelError::MissingLayer {
            index,
            available: self.layers.len(),
        })
    }

    /// The layer at `index`, which must hold a full grid of tile ids.
    pub fn tile_layer(&self, index: usize) -> Result<&TileLayer, LevelError> {
        let layer = self.layer(index)?;
        self.check_layer_size(index, layer)?;
        Ok(layer)
    }

    /// Non-empty tiles of a layer as `(column, row, tile_id)`, row-major.
    pub fn tiles<'a>(
        &'a self,
        layer: &'a TileLayer,
    ) -> impl Iterator<Item = (u32, u32, u32)> + 'a {
        let width = self.width.max(1);
        layer
            .data
            .iter()
            .enumerate()
            .filter(|(_, id)| **id != 0)
            .map(move |(i, id)| {
                let i = i as u32;
                (i % width, i / width, *id)
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
