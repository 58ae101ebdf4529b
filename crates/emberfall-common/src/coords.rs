//! Tile coordinates for terrain occupancy.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Coordinate of a map tile (world position divided by the tile size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// X coordinate in tile space
    pub x: i32,
    /// Y coordinate in tile space
    pub y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts a world position to the tile containing it.
    #[must_use]
    pub fn from_world(position: Vec2, tile_size: f32) -> Self {
        Self {
            x: (position.x / tile_size).floor() as i32,
            y: (position.y / tile_size).floor() as i32,
        }
    }

    /// World position of the tile's top-left corner.
    #[must_use]
    pub fn to_world(self, tile_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 * tile_size, self.y as f32 * tile_size)
    }
}
