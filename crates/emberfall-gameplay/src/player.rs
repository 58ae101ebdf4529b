//! The player entity.
//!
//! The player is plain value state: every system works on a cloned draft and
//! hands the result back to [`crate::world::World`] in a single commit.

use ahash::AHashMap;
use emberfall_common::{elapsed, EnemyId, Millis, Vec2};
use serde::{Deserialize, Serialize};

use crate::skills::SkillId;

/// Number of steps in the basic attack combo.
pub const ATTACK_SEQUENCE_LENGTH: u8 = 4;

/// Primary attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    /// Strength (sword aura scaling, basic attack damage)
    pub str: u32,
    /// Dexterity (sword spin scaling)
    pub dex: u32,
    /// Intelligence (dash, three-way cut, berserker scaling)
    pub int: u32,
    /// Vitality (three-way cut scaling)
    pub vit: u32,
}

impl BaseStats {
    /// Creates a stat block.
    #[must_use]
    pub const fn new(str: u32, dex: u32, int: u32, vit: u32) -> Self {
        Self { str, dex, int, vit }
    }
}

/// A timed multiplier on the player.
///
/// Presence of a buff does not mean it is active: only the elapsed time since
/// `start_time` decides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    /// When the buff was applied
    pub start_time: Millis,
    /// How long it lasts
    pub duration: Millis,
    /// Scalar applied while active
    pub multiplier: f32,
}

impl Buff {
    /// Creates a buff starting at `now`.
    #[must_use]
    pub const fn new(now: Millis, duration: Millis, multiplier: f32) -> Self {
        Self {
            start_time: now,
            duration,
            multiplier,
        }
    }

    /// Whether the buff window still covers `now`.
    #[must_use]
    pub fn is_active(&self, now: Millis) -> bool {
        elapsed(now, self.start_time) < self.duration
    }

    /// Remaining time, zero once expired.
    #[must_use]
    pub fn remaining(&self, now: Millis) -> Millis {
        self.duration.saturating_sub(elapsed(now, self.start_time))
    }
}

/// Named buffs the player can carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Buffs {
    /// Movement speed boost
    pub berserker: Option<Buff>,
    /// Basic attack damage boost
    pub sword_aura: Option<Buff>,
}

impl Buffs {
    /// Berserker speed multiplier, 1.0 when inactive.
    #[must_use]
    pub fn berserker_multiplier(&self, now: Millis) -> f32 {
        Self::active_multiplier(self.berserker, now)
    }

    /// Sword aura damage multiplier, 1.0 when inactive.
    #[must_use]
    pub fn sword_aura_multiplier(&self, now: Millis) -> f32 {
        Self::active_multiplier(self.sword_aura, now)
    }

    fn active_multiplier(buff: Option<Buff>, now: Millis) -> f32 {
        buff.filter(|b| b.is_active(now)).map_or(1.0, |b| b.multiplier)
    }
}

/// Kind of mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountKind {
    /// Standard horse
    Horse,
    /// Faster, rarer mount
    Wolf,
}

/// A mount the player can ride.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mount {
    /// Whether the player is currently riding
    pub active: bool,
    /// Mount kind
    pub kind: MountKind,
    /// Speed multiplier while riding
    pub speed_bonus: f32,
}

/// The local player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Position in world pixels
    pub position: Vec2,
    /// Last nonzero facing, unit length or zero
    pub direction: Vec2,
    /// Current health
    pub health: f32,
    /// Maximum health
    pub max_health: f32,
    /// Current mana, never negative
    pub mana: u32,
    /// Primary attributes
    pub stats: BaseStats,
    /// Learned skill levels (1..=21), absent means level 1
    pub skill_levels: AHashMap<SkillId, u32>,
    /// Unspent skill points
    pub skill_points: u32,
    /// Active or expired buffs
    pub buffs: Buffs,
    /// Optional mount
    pub mount: Option<Mount>,
    /// Equipment speed multiplier
    pub movement_speed_multiplier: f32,
    /// Whether a basic attack swing is in progress
    pub is_attacking: bool,
    /// Combo step, 0 when idle and 1..=4 during a combo
    pub attack_sequence: u8,
    /// When the last swing started
    pub last_attack_time: Millis,
    /// Set while a skill drives the player
    pub controls_disabled: bool,
    /// Whether the player auto-attacks its target
    pub auto_attacking: bool,
    /// Currently targeted enemy
    pub target_enemy: Option<EnemyId>,
    /// Whether the player moved on the last effective frame
    pub is_moving: bool,
    /// Hit flash flag (presentation only)
    pub is_hit: bool,
    /// When the hit flash started
    pub hit_time: Millis,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            direction: Vec2::new(0.0, 1.0),
            health: 100.0,
            max_health: 100.0,
            mana: 50,
            stats: BaseStats::default(),
            skill_levels: AHashMap::new(),
            skill_points: 0,
            buffs: Buffs::default(),
            mount: None,
            movement_speed_multiplier: 1.0,
            is_attacking: false,
            attack_sequence: 0,
            last_attack_time: 0,
            controls_disabled: false,
            auto_attacking: false,
            target_enemy: None,
            is_moving: false,
            is_hit: false,
            hit_time: 0,
        }
    }
}

impl Player {
    /// Create a new player at the given position.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Set base stats.
    #[must_use]
    pub fn with_stats(mut self, stats: BaseStats) -> Self {
        self.stats = stats;
        self
    }

    /// Set mana.
    #[must_use]
    pub fn with_mana(mut self, mana: u32) -> Self {
        self.mana = mana;
        self
    }

    /// Set a skill level.
    #[must_use]
    pub fn with_skill_level(mut self, skill: SkillId, level: u32) -> Self {
        self.skill_levels.insert(skill, level);
        self
    }

    /// Set a mount.
    #[must_use]
    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.mount = Some(mount);
        self
    }

    /// Level of a skill, defaulting to 1 when unset.
    #[must_use]
    pub fn skill_level(&self, skill: SkillId) -> u32 {
        self.skill_levels.get(&skill).copied().unwrap_or(1)
    }

    /// Whether the player is riding an active mount.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mount.is_some_and(|m| m.active)
    }

    /// Heal, clamped to max health. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        (self.health - before).max(0.0)
    }

    /// Point the player along `direction` if it is nonzero.
    pub fn face(&mut self, direction: Vec2) {
        let unit = emberfall_common::normalize(direction);
        if unit != Vec2::ZERO {
            self.direction = unit;
        }
    }
}
