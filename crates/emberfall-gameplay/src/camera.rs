//! Viewport that follows the player.

use emberfall_common::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{CameraConfig, MapBounds};

/// Minimum zoom level (zoomed out).
pub const MIN_ZOOM: f32 = 0.25;

/// Maximum zoom level (zoomed in).
pub const MAX_ZOOM: f32 = 4.0;

/// 2D camera. `position` is the world coordinate of the viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Top-left corner in world coordinates
    pub position: Vec2,
    /// Zoom level (1.0 = 1:1 pixel mapping)
    pub zoom: f32,
    /// Viewport size in pixels (width, height)
    pub viewport: (u32, u32),
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Camera {
    /// Create a camera from configuration.
    #[must_use]
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: config.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            viewport: (config.viewport_width, config.viewport_height),
        }
    }

    /// Set the viewport size (host window resized).
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    /// Set absolute zoom level (clamped).
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Visible world size at the current zoom.
    #[must_use]
    pub fn visible_size(&self) -> Vec2 {
        Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32) / self.zoom
    }

    /// Center the view on `target`, keeping it inside the map where possible.
    pub fn center_on(&mut self, target: Vec2, bounds: &MapBounds) {
        let visible = self.visible_size();
        let desired = target - visible / 2.0;
        let max_x = (bounds.width - visible.x).max(0.0);
        let max_y = (bounds.height - visible.y).max(0.0);
        self.position = Vec2::new(desired.x.clamp(0.0, max_x), desired.y.clamp(0.0, max_y));
    }

    /// Convert screen pixels to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.position + screen / self.zoom
    }

    /// Convert world coordinates to screen pixels.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.zoom
    }
}
