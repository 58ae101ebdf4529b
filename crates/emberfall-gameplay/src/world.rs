//! Authoritative world state.
//!
//! Systems never mutate the committed player or enemies in place. They clone
//! a draft, work on it, and commit the result here. A commit that changes
//! nothing is dropped, and every accepted commit bumps the revision so hosts
//! know when to re-render.

use emberfall_common::{EnemyId, Millis, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::Camera;
use crate::config::MapBounds;
use crate::enemy::Enemy;
use crate::player::Player;

/// Player, enemies, and camera as last committed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    player: Player,
    enemies: Vec<Enemy>,
    camera: Camera,
    revision: u64,
}

impl World {
    /// Creates a world around `player`.
    #[must_use]
    pub fn new(player: Player, camera: Camera) -> Self {
        Self {
            player,
            enemies: Vec::new(),
            camera,
            revision: 0,
        }
    }

    /// Committed player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Committed enemies.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Look up an enemy.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Committed camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Number of accepted commits.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the player if `next` differs. Returns whether it changed.
    pub fn commit_player(&mut self, next: Player) -> bool {
        if next == self.player {
            return false;
        }
        self.player = next;
        self.bump();
        true
    }

    /// Replace the enemies if `next` differs. Returns whether they changed.
    pub fn commit_enemies(&mut self, next: Vec<Enemy>) -> bool {
        if next == self.enemies {
            return false;
        }
        self.enemies = next;
        self.bump();
        true
    }

    /// Replace the camera if `next` differs. Returns whether it changed.
    pub fn commit_camera(&mut self, next: Camera) -> bool {
        if next == self.camera {
            return false;
        }
        self.camera = next;
        self.bump();
        true
    }

    /// Add an enemy.
    pub fn spawn_enemy(&mut self, enemy: Enemy) -> EnemyId {
        let id = enemy.id;
        let mut next = self.enemies.clone();
        next.push(enemy);
        self.commit_enemies(next);
        debug!("Spawned enemy {id}");
        id
    }

    /// Remove an enemy. Returns whether it existed.
    pub fn despawn_enemy(&mut self, id: EnemyId) -> bool {
        let next: Vec<Enemy> = self.enemies.iter().filter(|e| e.id != id).cloned().collect();
        self.commit_enemies(next)
    }

    /// Enemies within `radius` of `point`.
    pub fn enemies_near(&self, point: Vec2, radius: f32) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies
            .iter()
            .filter(move |e| e.position.distance(point) <= radius)
    }

    /// Move every knocked-back enemy along its push, keeping it inside
    /// `bounds`. Returns how many moved.
    pub fn advance_knockbacks(&mut self, now: Millis, bounds: &MapBounds) -> usize {
        let mut next = self.enemies.clone();
        let mut moved = 0;
        for enemy in &mut next {
            let from = enemy.position;
            if enemy.advance_knockback(now) {
                enemy.position = bounds.clamp(enemy.position);
                if enemy.position != from {
                    moved += 1;
                }
            }
        }
        if moved > 0 {
            self.commit_enemies(next);
        }
        moved
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}
