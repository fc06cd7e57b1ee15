//! Plain-data components attached to tile entities.
//!
//! The ECS core knows nothing about these shapes. They exist so that the
//! renderer and physics step have something to query for.

use serde::{Deserialize, Serialize};

/// A 2D vector in world pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle: top-left corner plus extent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Whether `point` lies inside the rectangle (right/bottom edges excluded).
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.position.x
            && point.y >= self.position.y
            && point.x < self.position.x + self.size.x
            && point.y < self.position.y + self.size.y
    }
}

/// Marks an entity as a map tile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTag;

/// What to draw for an entity: a region of a texture placed in the world.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Path of the texture the renderer should bind.
    pub texture: String,
    /// Region of the texture to sample, in texture pixels.
    pub source: Rect,
    /// Where to draw it, in world pixels.
    pub destination: Rect,
}

/// Static collision body.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub size: Vec2,
}

impl Body {
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// The body's bounds as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size)
    }
}
