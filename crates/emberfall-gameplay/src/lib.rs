//! # Emberfall Gameplay
//!
//! Simulation core for Emberfall.
//!
//! This crate provides the frame-driven gameplay layer:
//! - Player and enemy entities with copy-on-write world state
//! - Movement loop with enemy collision and tile obstruction
//! - Four-step basic attack combo and auto-attack
//! - Skill engine with cooldowns, mana, crits and effect sessions
//! - Stun, knockback and buff timers
//! - Enemy targeting, skill progression and camera follow
//! - Event bus for damage reports and audio cues

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod attack;
pub mod camera;
pub mod collision;
pub mod config;
pub mod effects;
pub mod enemy;
pub mod events;
pub mod input;
pub mod movement;
pub mod player;
pub mod progression;
pub mod selector;
pub mod session;
pub mod skills;
pub mod status;
pub mod terrain;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::attack::*;
    pub use crate::camera::*;
    pub use crate::collision::*;
    pub use crate::config::*;
    pub use crate::effects::*;
    pub use crate::enemy::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::movement::*;
    pub use crate::player::*;
    pub use crate::progression::*;
    pub use crate::selector::*;
    pub use crate::session::*;
    pub use crate::skills::*;
    pub use crate::status::*;
    pub use crate::terrain::*;
    pub use crate::world::*;
}

pub use prelude::*;
