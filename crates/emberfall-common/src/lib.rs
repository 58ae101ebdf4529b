//! # Emberfall Common
//!
//! Common types, utilities, and shared abstractions for Emberfall.
//!
//! This crate provides foundational types used by the simulation core:
//! - Vector helpers (distance, normalize)
//! - ID types (EnemyId, PlayerId)
//! - Tile coordinates for terrain occupancy
//! - Millisecond timestamps and clocks
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod time;
pub mod vector;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::time::*;
    pub use crate::vector::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coord_conversion() {
        let tile = TileCoord::from_world(Vec2::new(100.0, 65.0), 32.0);
        assert_eq!(tile, TileCoord::new(3, 2));

        let negative = TileCoord::from_world(Vec2::new(-1.0, 0.0), 32.0);
        assert_eq!(negative, TileCoord::new(-1, 0));
    }

    #[test]
    fn test_enemy_id_generation() {
        let id1 = EnemyId::new();
        let id2 = EnemyId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance(16);
        assert_eq!(clock.now_ms(), 1_016);
    }
}
