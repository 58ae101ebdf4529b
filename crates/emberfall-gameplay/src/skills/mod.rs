//! Skill definitions, crit rolls, and the cooldown-gated skill engine.
//!
//! Skills are immutable definition records registered once at startup.
//! Runtime state (when each skill was last used) lives only in the
//! [`SkillManager`] cooldown table.

pub mod formulas;
pub mod manager;
pub mod mental;
pub mod physical;

use std::fmt;
use std::str::FromStr;

use emberfall_common::{EnemyId, Millis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effects::EffectPlan;
use crate::enemy::Enemy;
use crate::events::DamageSink;
use crate::player::Player;

pub use formulas::*;
pub use manager::{Cast, SkillManager};

/// Identifier of a registered skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillId {
    /// Lunge at a nearby enemy, stunning and knocking it back
    Dash,
    /// Spinning area attack around the player
    SwordSpin,
    /// Three cones of slashes in front of the player
    ThreeWayCut,
    /// Movement speed buff
    Berserker,
    /// Basic attack damage buff
    SwordAura,
    /// Instant heal
    RedPotion,
}

impl SkillId {
    /// Every skill id in catalog order.
    pub const ALL: [Self; 6] = [
        Self::Dash,
        Self::SwordSpin,
        Self::ThreeWayCut,
        Self::Berserker,
        Self::SwordAura,
        Self::RedPotion,
    ];

    /// Stable string id.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dash => "dash",
            Self::SwordSpin => "sword-spin",
            Self::ThreeWayCut => "three-way-cut",
            Self::Berserker => "berserker",
            Self::SwordAura => "sword-aura",
            Self::RedPotion => "red-potion",
        }
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillId {
    type Err = SkillRejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| SkillRejection::Unknown(s.to_string()))
    }
}

/// Skill category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    /// Weapon and body techniques
    Physical,
    /// Mind-driven abilities and consumables
    Mental,
}

/// Why a skill activation did nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillRejection {
    /// Id is not registered
    #[error("unknown skill: {0}")]
    Unknown(String),
    /// Still cooling down
    #[error("{skill} on cooldown: {remaining}ms remaining")]
    OnCooldown {
        /// Skill that was requested
        skill: SkillId,
        /// Time left
        remaining: Millis,
    },
    /// Not enough mana
    #[error("{skill} needs {required} mana, player has {available}")]
    InsufficientMana {
        /// Skill that was requested
        skill: SkillId,
        /// Mana cost
        required: u32,
        /// Mana the player has
        available: u32,
    },
    /// The skill needs a living target in range and has none
    #[error("{skill} has no valid target")]
    NoTarget {
        /// Skill that was requested
        skill: SkillId,
    },
    /// Mounted players may only use restorative skills
    #[error("{skill} cannot be used while mounted")]
    Mounted {
        /// Skill that was requested
        skill: SkillId,
    },
    /// Current map does not allow combat
    #[error("combat is disabled on this map")]
    CombatDisabled,
    /// A skill effect is driving the player
    #[error("controls are disabled")]
    ControlsDisabled,
}

/// Decides whether a hit is critical.
pub trait CritRoll: fmt::Debug {
    /// Roll against `chance` percent.
    fn roll(&mut self, chance: f32) -> bool;
}

impl CritRoll for fastrand::Rng {
    fn roll(&mut self, chance: f32) -> bool {
        self.f32() * 100.0 < chance
    }
}

/// Never crits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCrit;

impl CritRoll for NeverCrit {
    fn roll(&mut self, _chance: f32) -> bool {
        false
    }
}

/// Always crits.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysCrit;

impl CritRoll for AlwaysCrit {
    fn roll(&mut self, _chance: f32) -> bool {
        true
    }
}

/// Everything a skill may read and mutate while casting.
///
/// `player` and `enemies` are drafts; the caller commits them afterwards.
pub struct SkillContext<'a> {
    /// Cast time
    pub now: Millis,
    /// Level of the skill being cast
    pub level: u32,
    /// Explicitly requested target
    pub target: Option<EnemyId>,
    /// Player draft
    pub player: &'a mut Player,
    /// Enemy drafts
    pub enemies: &'a mut [Enemy],
    /// Crit source
    pub crit: &'a mut dyn CritRoll,
    /// Damage report channel
    pub sink: &'a mut dyn DamageSink,
}

/// Checks a cast can go ahead. Runs before any state changes.
pub type CheckFn = fn(&SkillContext<'_>) -> Result<(), SkillRejection>;

/// Performs the cast, optionally returning a time-extended effect.
pub type ExecuteFn = fn(&mut SkillContext<'_>) -> Option<EffectPlan>;

/// Nominal damage for a player at a level, with or without crit.
pub type DamageFn = fn(&Player, u32, bool) -> u32;

/// Crit chance in percent for a player at a level.
pub type CritChanceFn = fn(&Player, u32) -> f32;

/// Immutable skill template.
#[derive(Clone)]
pub struct SkillDefinition {
    /// Skill id
    pub id: SkillId,
    /// Display name
    pub name: &'static str,
    /// Tooltip text
    pub description: &'static str,
    /// Icon asset path
    pub icon: &'static str,
    /// Cooldown counted from activation
    pub cooldown: Millis,
    /// Mana deducted on activation
    pub mana_cost: u32,
    /// Base damage shown in tooltips
    pub base_damage: u32,
    /// Category
    pub skill_type: SkillType,
    /// Pre-cast validation
    pub check: CheckFn,
    /// Cast routine
    pub execute: ExecuteFn,
    /// Damage formula, for damaging skills
    pub damage: Option<DamageFn>,
    /// Crit chance formula, for damaging skills
    pub crit_chance: Option<CritChanceFn>,
}

impl fmt::Debug for SkillDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillDefinition")
            .field("id", &self.id)
            .field("cooldown", &self.cooldown)
            .field("mana_cost", &self.mana_cost)
            .field("skill_type", &self.skill_type)
            .finish_non_exhaustive()
    }
}

impl SkillDefinition {
    /// Nominal damage for `player` at their current level of this skill.
    #[must_use]
    pub fn damage_for(&self, player: &Player, crit: bool) -> Option<u32> {
        self.damage
            .map(|f| f(player, player.skill_level(self.id), crit))
    }

    /// Crit chance for `player` at their current level of this skill.
    #[must_use]
    pub fn crit_chance_for(&self, player: &Player) -> Option<f32> {
        self.crit_chance
            .map(|f| f(player, player.skill_level(self.id)))
    }
}

/// Check for skills that can always be cast.
pub(crate) fn always_ready(_ctx: &SkillContext<'_>) -> Result<(), SkillRejection> {
    Ok(())
}

/// The full catalog: physical skills followed by mental skills.
#[must_use]
pub fn default_catalog() -> Vec<SkillDefinition> {
    let mut skills = physical::catalog();
    skills.extend(mental::catalog());
    skills
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_id_strings() {
        for id in SkillId::ALL {
            assert_eq!(id.as_str().parse::<SkillId>(), Ok(id));
        }
        assert_eq!(
            "fireball".parse::<SkillId>(),
            Err(SkillRejection::Unknown("fireball".to_string()))
        );
        assert_eq!(SkillId::ThreeWayCut.to_string(), "three-way-cut");
    }

    #[test]
    fn test_catalog_order() {
        let ids: Vec<SkillId> = default_catalog().iter().map(|s| s.id).collect();
        assert_eq!(ids, SkillId::ALL.to_vec());
    }

    #[test]
    fn test_damage_for_uses_player_level() {
        let catalog = default_catalog();
        let dash = catalog
            .iter()
            .find(|s| s.id == SkillId::Dash)
            .expect("dash");
        let player = Player::default();
        assert_eq!(dash.damage_for(&player, false), Some(32));

        let potion = catalog
            .iter()
            .find(|s| s.id == SkillId::RedPotion)
            .expect("potion");
        assert_eq!(potion.damage_for(&player, false), None);
    }

    #[test]
    fn test_fixed_rolls() {
        assert!(!NeverCrit.roll(100.0));
        assert!(AlwaysCrit.roll(0.0));

        let mut rng = fastrand::Rng::with_seed(7);
        assert!(!rng.roll(0.0));
        assert!(rng.roll(100.0));
    }
}
