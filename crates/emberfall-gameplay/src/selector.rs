//! Enemy targeting.
//!
//! Clicking near an enemy selects it; clicking the current target again
//! starts auto-attacking it. Dead or vanished targets are dropped every frame.

use emberfall_common::{distance, EnemyId, Vec2};
use tracing::debug;

use crate::config::SelectorConfig;
use crate::enemy::Enemy;
use crate::player::Player;

/// What a selection input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A new enemy became the target
    Targeted(EnemyId),
    /// The current target was clicked again; auto-attack is now on or off
    AutoAttack {
        /// Current target
        target: EnemyId,
        /// New auto-attack state
        enabled: bool,
    },
    /// Selection was cleared
    Cleared,
}

/// Click-to-target and target bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct EnemySelector {
    config: SelectorConfig,
}

impl EnemySelector {
    /// Creates a selector.
    #[must_use]
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Handle a click at `point` in world coordinates.
    pub fn select_at(&self, point: Vec2, player: &mut Player, enemies: &mut [Enemy]) -> Selection {
        let hit = enemies
            .iter()
            .filter(|e| e.is_targetable())
            .map(|e| (e.id, distance(point, e.position)))
            .filter(|(_, d)| *d <= self.config.click_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);

        match hit {
            Some(id) if player.target_enemy == Some(id) => {
                let enabled = self.toggle_auto_attack(player, enemies);
                Selection::AutoAttack {
                    target: id,
                    enabled,
                }
            },
            Some(id) => {
                Self::target(id, player, enemies);
                Selection::Targeted(id)
            },
            None => {
                Self::clear_selection(player, enemies);
                Selection::Cleared
            },
        }
    }

    /// Target the next living enemy in range, nearest first, wrapping around.
    pub fn cycle_target(&self, player: &mut Player, enemies: &mut [Enemy]) -> Option<EnemyId> {
        let origin = player.position;
        let mut candidates: Vec<(EnemyId, f32)> = enemies
            .iter()
            .filter(|e| e.is_targetable())
            .map(|e| (e.id, distance(origin, e.position)))
            .filter(|(_, d)| *d <= self.config.cycle_range)
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let next = match player
            .target_enemy
            .and_then(|current| candidates.iter().position(|(id, _)| *id == current))
        {
            Some(idx) => candidates.get((idx + 1) % candidates.len()),
            None => candidates.first(),
        }
        .map(|(id, _)| *id);

        match next {
            Some(id) => Self::target(id, player, enemies),
            None => Self::clear_selection(player, enemies),
        }
        next
    }

    /// Flip auto-attack on the current target. Returns the new state.
    ///
    /// Without a living target auto-attack is always off.
    pub fn toggle_auto_attack(&self, player: &mut Player, enemies: &[Enemy]) -> bool {
        let alive = player
            .target_enemy
            .and_then(|id| enemies.iter().find(|e| e.id == id))
            .is_some_and(Enemy::is_targetable);
        player.auto_attacking = alive && !player.auto_attacking;
        debug!("Auto-attack {}", if player.auto_attacking { "on" } else { "off" });
        player.auto_attacking
    }

    /// Whether `enemy` is within `range` of the player.
    #[must_use]
    pub fn is_in_range(player: &Player, enemy: &Enemy, range: f32) -> bool {
        distance(player.position, enemy.position) <= range
    }

    /// Drop the target if it died or no longer exists. Returns whether it was dropped.
    pub fn clear_dead_target(player: &mut Player, enemies: &mut [Enemy]) -> bool {
        let Some(id) = player.target_enemy else {
            return false;
        };
        let alive = enemies
            .iter()
            .find(|e| e.id == id)
            .is_some_and(|e| !e.is_dead());
        if alive {
            return false;
        }
        debug!("Target {id} is gone, clearing selection");
        Self::clear_selection(player, enemies);
        true
    }

    /// Clear target, selection flags, and auto-attack.
    pub fn clear_selection(player: &mut Player, enemies: &mut [Enemy]) {
        player.target_enemy = None;
        player.auto_attacking = false;
        for enemy in enemies.iter_mut() {
            enemy.is_selected = false;
        }
    }

    fn target(id: EnemyId, player: &mut Player, enemies: &mut [Enemy]) {
        if player.target_enemy != Some(id) {
            player.auto_attacking = false;
        }
        player.target_enemy = Some(id);
        for enemy in enemies.iter_mut() {
            enemy.is_selected = enemy.id == id;
        }
    }
}
