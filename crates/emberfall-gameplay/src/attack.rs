//! Basic attack combo and hitboxes.
//!
//! The space bar swings through a four-step combo. Each step has its own
//! hitbox size and damage multiplier.

use emberfall_common::{normalize, EnemyId, Millis, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::enemy::Enemy;
use crate::events::DamageSink;
use crate::player::{Player, ATTACK_SEQUENCE_LENGTH};

/// Hitbox (length along facing, width across) per combo step.
pub const SWING_SIZES: [(f32, f32); 4] = [(60.0, 40.0), (70.0, 40.0), (80.0, 50.0), (100.0, 60.0)];

/// Damage multiplier per combo step.
pub const SWING_DAMAGE: [f32; 4] = [1.0, 1.1, 1.2, 1.5];

/// Combo step after `current`: 1, 2, 3, 4, 1, ...
#[must_use]
pub fn next_sequence(current: u8) -> u8 {
    (current % ATTACK_SEQUENCE_LENGTH) + 1
}

fn step_index(sequence: u8) -> usize {
    usize::from(sequence.clamp(1, ATTACK_SEQUENCE_LENGTH) - 1)
}

/// Oriented rectangle in front of the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    /// Center in world coordinates
    pub center: Vec2,
    /// Unit facing the box is aligned to
    pub direction: Vec2,
    /// Half extent along the facing
    pub half_length: f32,
    /// Half extent across the facing
    pub half_width: f32,
    /// Combo step that produced it
    pub sequence: u8,
}

impl Hitbox {
    /// Hitbox for a swing from `position` facing `direction`.
    ///
    /// A zero facing swings downward.
    #[must_use]
    pub fn for_swing(position: Vec2, direction: Vec2, sequence: u8, offset: f32) -> Self {
        let facing = match normalize(direction) {
            v if v == Vec2::ZERO => Vec2::Y,
            v => v,
        };
        let (length, width) = SWING_SIZES[step_index(sequence)];
        Self {
            center: position + facing * (offset + length / 2.0),
            direction: facing,
            half_length: length / 2.0,
            half_width: width / 2.0,
            sequence,
        }
    }

    /// Whether `point` lies inside the box.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let local = point - self.center;
        let along = local.dot(self.direction);
        let across = local.dot(self.direction.perp());
        along.abs() <= self.half_length && across.abs() <= self.half_width
    }
}

/// Damage of a basic swing, after combo step and sword aura.
#[must_use]
pub fn basic_attack_damage(
    player: &Player,
    sequence: u8,
    now: Millis,
    config: &CombatConfig,
) -> f32 {
    let base = config.base_damage + player.stats.str as f32 / 2.0;
    (base * SWING_DAMAGE[step_index(sequence)] * player.buffs.sword_aura_multiplier(now)).floor()
}

/// One enemy struck by a swing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingHit {
    /// Enemy struck
    pub target: EnemyId,
    /// Health removed
    pub amount: f32,
    /// Whether the hit killed it
    pub killed: bool,
}

/// Apply `damage` to every damageable enemy inside `hitbox`.
///
/// Each nonzero health change is reported to `sink`.
pub fn resolve_swing(
    hitbox: &Hitbox,
    damage: f32,
    enemies: &mut [Enemy],
    now: Millis,
    sink: &mut dyn DamageSink,
) -> Vec<SwingHit> {
    let mut hits = Vec::new();
    for enemy in enemies
        .iter_mut()
        .filter(|e| e.is_targetable() && hitbox.contains(e.position))
    {
        let amount = enemy.take_damage(damage, now);
        if amount > 0.0 {
            sink.report(enemy.id, amount);
            hits.push(SwingHit {
                target: enemy.id,
                amount,
                killed: enemy.is_dead(),
            });
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{BaseStats, Buff};
    use proptest::prelude::*;

    #[test]
    fn test_sequence_cycles() {
        let mut seq = 0;
        let mut seen = Vec::new();
        for _ in 0..6 {
            seq = next_sequence(seq);
            seen.push(seq);
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 1, 2]);
    }

    #[test]
    fn test_hitbox_in_front_only() {
        let hitbox = Hitbox::for_swing(Vec2::ZERO, Vec2::X, 1, 10.0);
        assert_eq!(hitbox.center, Vec2::new(40.0, 0.0));
        assert!(hitbox.contains(Vec2::new(30.0, 15.0)));
        assert!(!hitbox.contains(Vec2::new(-30.0, 0.0)));
        assert!(!hitbox.contains(Vec2::new(30.0, 25.0)));
    }

    #[test]
    fn test_finisher_hitbox_is_larger() {
        let first = Hitbox::for_swing(Vec2::ZERO, Vec2::Y, 1, 10.0);
        let finisher = Hitbox::for_swing(Vec2::ZERO, Vec2::Y, 4, 10.0);
        let probe = Vec2::new(0.0, 100.0);
        assert!(!first.contains(probe));
        assert!(finisher.contains(probe));
    }

    #[test]
    fn test_zero_direction_swings_down() {
        let hitbox = Hitbox::for_swing(Vec2::ZERO, Vec2::ZERO, 2, 10.0);
        assert!(hitbox.center.y > 0.0);
    }

    #[test]
    fn test_basic_damage_scaling() {
        let config = CombatConfig::default();
        let mut player = Player::default().with_stats(BaseStats::new(10, 0, 0, 0));
        assert_eq!(basic_attack_damage(&player, 1, 0, &config), 15.0);
        assert_eq!(basic_attack_damage(&player, 4, 0, &config), 22.0);

        player.buffs.sword_aura = Some(Buff::new(0, 1_000, 1.2));
        assert_eq!(basic_attack_damage(&player, 1, 500, &config), 18.0);
        assert_eq!(basic_attack_damage(&player, 1, 1_000, &config), 15.0);
    }

    #[test]
    fn test_resolve_swing_reports_each_hit() {
        let hitbox = Hitbox::for_swing(Vec2::ZERO, Vec2::X, 1, 10.0);
        let mut enemies = vec![
            Enemy::new(Vec2::new(30.0, 0.0), 100.0),
            Enemy::new(Vec2::new(50.0, 5.0), 8.0),
            Enemy::new(Vec2::new(-30.0, 0.0), 100.0),
            Enemy::invulnerable(Vec2::new(40.0, 0.0)),
        ];
        let mut reported = Vec::new();
        let hits = resolve_swing(&hitbox, 10.0, &mut enemies, 7, &mut |d: f32| reported.push(d));

        assert_eq!(reported, vec![10.0, 8.0]);
        assert_eq!(hits.len(), 2);
        assert!(!hits[0].killed);
        assert!(hits[1].killed);
        assert_eq!(enemies[2].health.current(), Some(100.0));
    }

    proptest! {
        #[test]
        fn sequence_stays_in_range(start in 0u8..=4, steps in 1usize..20) {
            let mut seq = start;
            for _ in 0..steps {
                let next = next_sequence(seq);
                prop_assert!((1..=4).contains(&next));
                prop_assert_eq!(next, if seq == 4 { 1 } else { seq + 1 });
                seq = next;
            }
        }
    }
}
