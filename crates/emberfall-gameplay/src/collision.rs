//! Player-versus-enemy collision response.
//!
//! Enemies never block movement outright. Overlapping ones push the player
//! aside, and a clump of enemies pressed against the player rejects the move.

use emberfall_common::{distance, normalize, Vec2};

use crate::config::{CollisionConfig, MapBounds};
use crate::enemy::Enemy;
use crate::terrain::MapContext;

/// Result of scanning enemies around a candidate position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyOverlap {
    /// No enemy within the collision radius
    Clear,
    /// At least one overlap; push along this unit (or zero) vector
    Push(Vec2),
    /// Two or more enemies closer than the stuck distance
    Stuck,
}

/// Scan living enemies around `candidate`.
///
/// Invulnerable enemies are never dead, so they collide like any other.
#[must_use]
pub fn scan_enemy_overlap(
    candidate: Vec2,
    enemies: &[Enemy],
    config: &CollisionConfig,
) -> EnemyOverlap {
    let mut repulsion = Vec2::ZERO;
    let mut overlaps = 0usize;
    let mut close = 0usize;

    for enemy in enemies.iter().filter(|e| !e.is_dead()) {
        let dist = distance(candidate, enemy.position);
        if dist >= config.radius {
            continue;
        }
        overlaps += 1;
        if dist < config.stuck_distance {
            close += 1;
        }
        repulsion += normalize(candidate - enemy.position);
    }

    if close >= 2 {
        EnemyOverlap::Stuck
    } else if overlaps > 0 {
        EnemyOverlap::Push(normalize(repulsion))
    } else {
        EnemyOverlap::Clear
    }
}

/// Outcome of resolving one movement step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResolution {
    /// Where the player ends up
    pub position: Vec2,
    /// Whether an enemy overlap was resolved (slowdown applied)
    pub collided: bool,
}

/// Move from `origin` along `intent` by `speed`, resolving enemy and terrain collisions.
///
/// `intent` is a unit vector. The returned position is either a fully
/// resolved destination or `origin` itself, never something in between.
#[must_use]
pub fn resolve_movement(
    origin: Vec2,
    intent: Vec2,
    speed: f32,
    enemies: &[Enemy],
    config: &CollisionConfig,
    bounds: &MapBounds,
    map: &MapContext<'_>,
) -> MoveResolution {
    let blocked = MoveResolution {
        position: origin,
        collided: false,
    };

    let candidate = bounds.clamp(origin + intent * speed);
    let resolution = match scan_enemy_overlap(candidate, enemies, config) {
        EnemyOverlap::Clear => MoveResolution {
            position: candidate,
            collided: false,
        },
        EnemyOverlap::Stuck => return blocked,
        EnemyOverlap::Push(push) => {
            let slowed = origin + intent * (speed * config.slowdown);
            MoveResolution {
                position: bounds.clamp(slowed + push * config.push_strength),
                collided: true,
            }
        },
    };

    if map.is_walkable(resolution.position) {
        resolution
    } else {
        blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{MapId, PlacedTiles};
    use emberfall_common::TileCoord;

    fn config() -> CollisionConfig {
        CollisionConfig::default()
    }

    fn bounds() -> MapBounds {
        MapBounds::default()
    }

    fn open() -> MapContext<'static> {
        MapContext::open(MapId::Wilderness)
    }

    #[test]
    fn test_clear_path() {
        let origin = Vec2::new(100.0, 100.0);
        let result = resolve_movement(origin, Vec2::X, 4.0, &[], &config(), &bounds(), &open());
        assert_eq!(result.position, Vec2::new(104.0, 100.0));
        assert!(!result.collided);
    }

    #[test]
    fn test_single_overlap_pushes_away() {
        let origin = Vec2::new(100.0, 100.0);
        let enemies = vec![Enemy::new(Vec2::new(104.0, 130.0), 10.0)];
        let result =
            resolve_movement(origin, Vec2::X, 4.0, &enemies, &config(), &bounds(), &open());
        assert!(result.collided);
        // Pushed up, away from the enemy below.
        assert!(result.position.y < 100.0);
        assert!((result.position.x - 102.8).abs() < 1e-4);
    }

    #[test]
    fn test_stuck_between_two_enemies_rejects_move() {
        let origin = Vec2::new(100.0, 100.0);
        let enemies = vec![
            Enemy::new(Vec2::new(110.0, 100.0), 10.0),
            Enemy::new(Vec2::new(104.0, 108.0), 10.0),
        ];
        assert_eq!(
            scan_enemy_overlap(Vec2::new(104.0, 100.0), &enemies, &config()),
            EnemyOverlap::Stuck
        );
        let result =
            resolve_movement(origin, Vec2::X, 4.0, &enemies, &config(), &bounds(), &open());
        assert_eq!(result.position, origin);
    }

    #[test]
    fn test_dead_enemies_ignored() {
        let mut dead = Enemy::new(Vec2::new(104.0, 100.0), 10.0);
        dead.take_damage(10.0, 0);
        assert_eq!(
            scan_enemy_overlap(Vec2::new(104.0, 100.0), &[dead], &config()),
            EnemyOverlap::Clear
        );
    }

    #[test]
    fn test_invulnerable_enemies_collide() {
        let dummy = Enemy::invulnerable(Vec2::new(120.0, 100.0));
        assert!(matches!(
            scan_enemy_overlap(Vec2::new(104.0, 100.0), &[dummy], &config()),
            EnemyOverlap::Push(_)
        ));
    }

    #[test]
    fn test_nudge_into_terrain_falls_back() {
        let tiles = PlacedTiles::new([TileCoord::new(3, 2)]);
        let map = MapContext::with_occupancy(MapId::Village, &tiles);
        let origin = Vec2::new(95.0, 90.0);
        // The nudged step lands at (97.8, 93.0), inside the placed tile.
        let enemies = vec![Enemy::new(Vec2::new(99.0, 60.0), 10.0)];
        let result = resolve_movement(origin, Vec2::X, 4.0, &enemies, &config(), &bounds(), &map);
        assert_eq!(result.position, origin);
    }

    #[test]
    fn test_clamped_to_bounds() {
        let origin = Vec2::new(1.0, 1.0);
        let result = resolve_movement(
            origin,
            Vec2::new(-1.0, 0.0),
            4.0,
            &[],
            &config(),
            &bounds(),
            &open(),
        );
        assert_eq!(result.position, Vec2::new(0.0, 1.0));
    }
}
