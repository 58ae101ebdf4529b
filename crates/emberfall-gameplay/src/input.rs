//! Pressed-key state fed by the host's key listeners.
//!
//! The host refreshes this map asynchronously; the frame loop only reads it.

use ahash::AHashSet;
use emberfall_common::{normalize, Vec2};
use serde::{Deserialize, Serialize};

/// Keys the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Move up
    W,
    /// Move left
    A,
    /// Move down
    S,
    /// Move right
    D,
    /// Primary attack
    Space,
    /// Skill slot 1
    Digit1,
    /// Skill slot 2
    Digit2,
    /// Skill slot 3
    Digit3,
    /// Skill slot 4
    Digit4,
    /// Skill slot 5
    Digit5,
    /// Skill slot 6
    Digit6,
}

impl Key {
    /// Skill slot keys in slot order.
    pub const HOTKEYS: [Key; 6] = [
        Key::Digit1,
        Key::Digit2,
        Key::Digit3,
        Key::Digit4,
        Key::Digit5,
        Key::Digit6,
    ];

    /// Parse a browser key name (`"w"`, `"KeyW"`, `" "`, `"Digit1"`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "w" | "W" | "KeyW" => Key::W,
            "a" | "A" | "KeyA" => Key::A,
            "s" | "S" | "KeyS" => Key::S,
            "d" | "D" | "KeyD" => Key::D,
            " " | "Space" | "Spacebar" => Key::Space,
            "1" | "Digit1" => Key::Digit1,
            "2" | "Digit2" => Key::Digit2,
            "3" | "Digit3" => Key::Digit3,
            "4" | "Digit4" => Key::Digit4,
            "5" | "Digit5" => Key::Digit5,
            "6" | "Digit6" => Key::Digit6,
            _ => return None,
        };
        Some(key)
    }
}

/// Live mapping of key to pressed state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState {
    pressed: AHashSet<Key>,
}

impl KeyState {
    /// Create an empty key state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition.
    pub fn set(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.pressed.insert(key);
        } else {
            self.pressed.remove(&key);
        }
    }

    /// Record a transition by browser key name. Unknown names are ignored.
    pub fn set_named(&mut self, name: &str, pressed: bool) {
        if let Some(key) = Key::from_name(name) {
            self.set(key, pressed);
        }
    }

    /// Release every key (focus loss).
    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    /// Whether `key` is held.
    #[must_use]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Movement intent from W/A/S/D, unit length or zero.
    #[must_use]
    pub fn movement_intent(&self) -> Vec2 {
        let mut intent = Vec2::ZERO;
        if self.is_pressed(Key::W) {
            intent.y -= 1.0;
        }
        if self.is_pressed(Key::S) {
            intent.y += 1.0;
        }
        if self.is_pressed(Key::A) {
            intent.x -= 1.0;
        }
        if self.is_pressed(Key::D) {
            intent.x += 1.0;
        }
        normalize(intent)
    }

    /// First held skill slot (0-based).
    #[must_use]
    pub fn held_hotkey(&self) -> Option<usize> {
        Key::HOTKEYS.iter().position(|k| self.is_pressed(*k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_intent_diagonal_is_unit() {
        let mut keys = KeyState::new();
        keys.set(Key::W, true);
        keys.set(Key::D, true);
        let intent = keys.movement_intent();
        assert!((intent.length() - 1.0).abs() < 1e-6);
        assert!(intent.x > 0.0 && intent.y < 0.0);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut keys = KeyState::new();
        keys.set(Key::A, true);
        keys.set(Key::D, true);
        assert_eq!(keys.movement_intent(), Vec2::ZERO);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("KeyW"), Some(Key::W));
        assert_eq!(Key::from_name(" "), Some(Key::Space));
        assert_eq!(Key::from_name("Digit3"), Some(Key::Digit3));
        assert_eq!(Key::from_name("Escape"), None);
    }

    #[test]
    fn test_release_and_hotkey() {
        let mut keys = KeyState::new();
        keys.set_named("2", true);
        assert_eq!(keys.held_hotkey(), Some(1));
        keys.set_named("Digit2", false);
        assert_eq!(keys.held_hotkey(), None);
        keys.set(Key::Space, true);
        keys.clear();
        assert!(!keys.is_pressed(Key::Space));
    }
}
