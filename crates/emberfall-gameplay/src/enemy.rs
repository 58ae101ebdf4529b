//! Enemy entities.

use emberfall_common::{elapsed, EnemyId, Millis, Vec2};
use serde::{Deserialize, Serialize};

/// Health of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Health {
    /// Can be damaged and killed.
    Mortal {
        /// Current health, 0 means dead
        current: f32,
        /// Maximum health
        max: f32,
    },
    /// Cannot be damaged or targeted; never counts as dead.
    Invulnerable,
}

impl Health {
    /// Full health with the given maximum.
    #[must_use]
    pub const fn full(max: f32) -> Self {
        Self::Mortal { current: max, max }
    }

    /// Whether the enemy is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Mortal { current, .. } if *current <= 0.0)
    }

    /// Whether damage can be applied.
    #[must_use]
    pub fn is_damageable(&self) -> bool {
        matches!(self, Self::Mortal { current, .. } if *current > 0.0)
    }

    /// Current health, `None` for invulnerable enemies.
    #[must_use]
    pub fn current(&self) -> Option<f32> {
        match self {
            Self::Mortal { current, .. } => Some(*current),
            Self::Invulnerable => None,
        }
    }

    /// Remove `amount` health, clamping at zero. Returns the health actually removed.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        match self {
            Self::Mortal { current, .. } => {
                let before = *current;
                *current = (*current - amount.max(0.0)).max(0.0);
                before - *current
            },
            Self::Invulnerable => 0.0,
        }
    }
}

/// Active stun status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stun {
    /// When the stun was applied
    pub start_time: Millis,
    /// Stun length
    pub duration: Millis,
}

/// Status effects on an enemy. Expired effects stay in place and read as inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffects {
    /// Stun, if one was ever applied
    pub stun: Option<Stun>,
}

/// A timed displacement pushing an enemy away from a hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    /// Position the enemy was pushed from
    pub origin: Vec2,
    /// Unit push direction
    pub direction: Vec2,
    /// Total push distance in pixels
    pub distance: f32,
    /// When the push started
    pub start_time: Millis,
    /// How long the push takes
    pub duration: Millis,
}

impl Knockback {
    /// Whether the push is still moving the enemy.
    #[must_use]
    pub fn is_active(&self, now: Millis) -> bool {
        elapsed(now, self.start_time) < self.duration
    }

    /// Position along the push at `now`.
    #[must_use]
    pub fn position_at(&self, now: Millis) -> Vec2 {
        let progress = if self.duration == 0 {
            1.0
        } else {
            (elapsed(now, self.start_time) as f32 / self.duration as f32).min(1.0)
        };
        self.origin + self.direction * (self.distance * progress)
    }
}

/// An enemy in the current map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Unique id
    pub id: EnemyId,
    /// Position in world pixels
    pub position: Vec2,
    /// Health state
    pub health: Health,
    /// Whether the player selected this enemy
    pub is_selected: bool,
    /// Timed debuffs
    pub status_effects: StatusEffects,
    /// Timed displacement from the last heavy hit
    pub knockback: Option<Knockback>,
    /// Hit flash flag (presentation only)
    pub is_hit: bool,
    /// When the hit flash started
    pub hit_time: Millis,
}

impl Enemy {
    /// Create a new enemy with full health.
    #[must_use]
    pub fn new(position: Vec2, max_health: f32) -> Self {
        Self {
            id: EnemyId::new(),
            position,
            health: Health::full(max_health),
            is_selected: false,
            status_effects: StatusEffects::default(),
            knockback: None,
            is_hit: false,
            hit_time: 0,
        }
    }

    /// Create an invulnerable enemy (training dummies, scenery).
    #[must_use]
    pub fn invulnerable(position: Vec2) -> Self {
        Self {
            health: Health::Invulnerable,
            ..Self::new(position, 1.0)
        }
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: EnemyId) -> Self {
        self.id = id;
        self
    }

    /// Whether the enemy is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    /// Whether skills and attacks may target this enemy.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.health.is_damageable()
    }

    /// Apply damage and flash. Returns the health actually removed.
    pub fn take_damage(&mut self, amount: f32, now: Millis) -> f32 {
        let dealt = self.health.apply_damage(amount);
        if dealt > 0.0 {
            self.is_hit = true;
            self.hit_time = now;
        }
        dealt
    }

    /// Move the enemy along its knockback, if one is in progress.
    ///
    /// Returns `true` if the position changed.
    pub fn advance_knockback(&mut self, now: Millis) -> bool {
        let Some(knockback) = self.knockback else {
            return false;
        };
        // Let the final frame land exactly on the end point.
        if elapsed(now, knockback.start_time) > knockback.duration + 50 {
            return false;
        }
        let target = knockback.position_at(now);
        if target == self.position {
            return false;
        }
        self.position = target;
        true
    }
}
