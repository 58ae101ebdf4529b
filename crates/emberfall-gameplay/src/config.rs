//! Simulation tuning.
//!
//! Every constant the frame loop, collision, and targeting read lives here.
//! Configuration can be loaded from and saved to a TOML file.

use emberfall_common::{Millis, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem failure
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    /// Could not encode the config
    #[error("config encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Playable area in world pixels, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    /// Map width
    pub width: f32,
    /// Map height
    pub height: f32,
}

impl Default for MapBounds {
    fn default() -> Self {
        Self {
            width: 2_400.0,
            height: 1_800.0,
        }
    }
}

impl MapBounds {
    /// Clamp a position into the map.
    #[must_use]
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.clamp(0.0, self.width),
            position.y.clamp(0.0, self.height),
        )
    }
}

/// Movement tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Minimum spacing between effective frame updates
    pub frame_interval_ms: Millis,
    /// Pixels moved per effective frame before modifiers
    pub base_speed: f32,
    /// Speed multiplier just after a swing ends (unmounted only)
    pub attack_slowdown: f32,
    /// How long the slowdown lingers after a swing ends
    pub attack_slowdown_ms: Millis,
    /// Minimum spacing between walk sounds
    pub walk_sound_interval_ms: Millis,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            base_speed: 4.0,
            attack_slowdown: 0.6,
            attack_slowdown_ms: 300,
            walk_sound_interval_ms: 350,
        }
    }
}

/// Enemy collision tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Enemies closer than this overlap the player
    pub radius: f32,
    /// Two or more enemies this close mean the player is stuck
    pub stuck_distance: f32,
    /// Pixels the player is pushed out of an overlap
    pub push_strength: f32,
    /// Speed multiplier on a frame that resolved a collision
    pub slowdown: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            radius: 40.0,
            stuck_distance: 15.0,
            push_strength: 3.0,
            slowdown: 0.7,
        }
    }
}

/// Basic attack tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Length of one swing
    pub attack_duration_ms: Millis,
    /// Idle time after the last swing before the combo restarts
    pub sequence_reset_ms: Millis,
    /// Gap between the player and the near edge of the hitbox
    pub hitbox_offset: f32,
    /// Base damage before strength and combo scaling
    pub base_damage: f32,
    /// Distance at which auto-attack stops walking and swings
    pub auto_attack_range: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_duration_ms: 400,
            sequence_reset_ms: 800,
            hitbox_offset: 10.0,
            base_damage: 10.0,
            auto_attack_range: 80.0,
        }
    }
}

/// Target selection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// How far from an enemy a click still selects it
    pub click_radius: f32,
    /// How far from the player target cycling looks
    pub cycle_range: f32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            click_radius: 40.0,
            cycle_range: 400.0,
        }
    }
}

/// Camera tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Zoom level (1.0 = 1:1)
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
            zoom: 1.0,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Map size
    pub bounds: MapBounds,
    /// Movement tuning
    pub movement: MovementConfig,
    /// Collision tuning
    pub collision: CollisionConfig,
    /// Basic attack tuning
    pub combat: CombatConfig,
    /// Targeting tuning
    pub selector: SelectorConfig,
    /// Camera tuning
    pub camera: CameraConfig,
}

impl GameConfig {
    /// Load configuration from a TOML file.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str::<Self>(&contents) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a TOML file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.bounds.width = self.bounds.width.max(1.0);
        self.bounds.height = self.bounds.height.max(1.0);

        self.movement.frame_interval_ms = self.movement.frame_interval_ms.clamp(1, 100);
        self.movement.base_speed = self.movement.base_speed.clamp(0.0, 64.0);
        self.movement.attack_slowdown = self.movement.attack_slowdown.clamp(0.0, 1.0);

        self.collision.radius = self.collision.radius.max(0.0);
        self.collision.stuck_distance = self.collision.stuck_distance.clamp(0.0, self.collision.radius);
        self.collision.slowdown = self.collision.slowdown.clamp(0.0, 1.0);

        self.combat.attack_duration_ms = self.combat.attack_duration_ms.max(1);
        self.combat.auto_attack_range = self.combat.auto_attack_range.max(0.0);

        self.selector.click_radius = self.selector.click_radius.max(0.0);
        self.selector.cycle_range = self.selector.cycle_range.max(0.0);

        self.camera.viewport_width = self.camera.viewport_width.max(1);
        self.camera.viewport_height = self.camera.viewport_height.max(1);
        self.camera.zoom = self.camera.zoom.clamp(0.25, 4.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = GameConfig::load_from(dir.path().join("nope.toml"));
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("emberfall.toml");

        let mut config = GameConfig::default();
        config.movement.base_speed = 6.0;
        config.combat.attack_duration_ms = 250;
        config.save_to(&path).expect("save");

        let loaded = GameConfig::load_from(&path);
        assert_eq!(loaded.movement.base_speed, 6.0);
        assert_eq!(loaded.combat.attack_duration_ms, 250);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("partial.toml");
        fs::write(&path, "[collision]\nradius = 55.0\n").expect("write");

        let config = GameConfig::load_from(&path);
        assert_eq!(config.collision.radius, 55.0);
        assert_eq!(config.collision.stuck_distance, 15.0);
        assert_eq!(config.movement, MovementConfig::default());
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "this is = = not toml").expect("write");
        assert_eq!(GameConfig::load_from(&path), GameConfig::default());
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = GameConfig::default();
        config.camera.zoom = 100.0;
        config.collision.slowdown = 3.0;
        config.validate();
        assert_eq!(config.camera.zoom, 4.0);
        assert_eq!(config.collision.slowdown, 1.0);
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = MapBounds {
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(bounds.clamp(Vec2::new(-5.0, 80.0)), Vec2::new(0.0, 50.0));
    }
}
