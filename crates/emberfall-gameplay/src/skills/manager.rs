//! Skill registry and cooldown engine.

use ahash::AHashMap;
use emberfall_common::{elapsed, EnemyId, Millis};
use tracing::{debug, info};

use super::{
    default_catalog, CritRoll, SkillContext, SkillDefinition, SkillId, SkillRejection, SkillType,
};
use crate::effects::{EffectHandle, EffectScheduler};
use crate::enemy::Enemy;
use crate::events::DamageSink;
use crate::player::Player;

/// Timing and targeting of one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cast {
    /// Activation time
    pub now: Millis,
    /// Explicit target, if the caller picked one
    pub target: Option<EnemyId>,
}

impl Cast {
    /// Untargeted cast at `now`.
    #[must_use]
    pub const fn at(now: Millis) -> Self {
        Self { now, target: None }
    }

    /// Set an explicit target.
    #[must_use]
    pub const fn with_target(mut self, target: EnemyId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Registered skills plus the last-used table.
#[derive(Debug)]
pub struct SkillManager {
    skills: Vec<SkillDefinition>,
    last_used: AHashMap<SkillId, Millis>,
    crit: Box<dyn CritRoll>,
}

impl Default for SkillManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillManager {
    /// Full catalog with a randomly seeded crit roll.
    #[must_use]
    pub fn new() -> Self {
        Self::with_skills(default_catalog(), Box::new(fastrand::Rng::new()))
    }

    /// Custom catalog and crit source.
    #[must_use]
    pub fn with_skills(skills: Vec<SkillDefinition>, crit: Box<dyn CritRoll>) -> Self {
        info!("Registered {} skills", skills.len());
        Self {
            skills,
            last_used: AHashMap::new(),
            crit,
        }
    }

    /// Replace the crit source.
    #[must_use]
    pub fn with_crit_roll(mut self, crit: Box<dyn CritRoll>) -> Self {
        self.crit = crit;
        self
    }

    /// Mutable access to the crit source, shared with running effects.
    pub fn crit_roll(&mut self) -> &mut dyn CritRoll {
        self.crit.as_mut()
    }

    /// Look up a skill.
    #[must_use]
    pub fn skill(&self, id: SkillId) -> Option<&SkillDefinition> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// Look up a skill by its string id.
    #[must_use]
    pub fn skill_named(&self, name: &str) -> Option<&SkillDefinition> {
        name.parse().ok().and_then(|id| self.skill(id))
    }

    /// Every registered skill in catalog order.
    #[must_use]
    pub fn all_skills(&self) -> &[SkillDefinition] {
        &self.skills
    }

    /// Physical skills in catalog order.
    pub fn physical_skills(&self) -> impl Iterator<Item = &SkillDefinition> + '_ {
        self.skills_of(SkillType::Physical)
    }

    /// Mental skills in catalog order.
    pub fn mental_skills(&self) -> impl Iterator<Item = &SkillDefinition> + '_ {
        self.skills_of(SkillType::Mental)
    }

    fn skills_of(&self, kind: SkillType) -> impl Iterator<Item = &SkillDefinition> + '_ {
        self.skills.iter().filter(move |s| s.skill_type == kind)
    }

    /// Time left before `id` can be used again. Unknown or unused skills report 0.
    #[must_use]
    pub fn remaining_cooldown(&self, id: SkillId, now: Millis) -> Millis {
        let Some(skill) = self.skill(id) else {
            return 0;
        };
        self.last_used
            .get(&id)
            .map_or(0, |last| skill.cooldown.saturating_sub(elapsed(now, *last)))
    }

    /// When `id` was last activated.
    #[must_use]
    pub fn last_used(&self, id: SkillId) -> Option<Millis> {
        self.last_used.get(&id).copied()
    }

    /// Forget when `id` was last used.
    pub fn reset_cooldown(&mut self, id: SkillId) {
        self.last_used.remove(&id);
    }

    /// Forget every cooldown.
    pub fn reset_all_cooldowns(&mut self) {
        self.last_used.clear();
    }

    /// Activate a skill, reporting why nothing happened.
    ///
    /// Every gate runs before any state changes. On success the cooldown
    /// is stamped first, then mana is spent, then the skill executes. A
    /// time-extended skill starts a session in `effects` and its handle is
    /// returned.
    pub fn try_use_skill(
        &mut self,
        id: SkillId,
        cast: Cast,
        player: &mut Player,
        enemies: &mut [Enemy],
        effects: &mut EffectScheduler,
        sink: &mut dyn DamageSink,
    ) -> Result<Option<EffectHandle>, SkillRejection> {
        let remaining = self.remaining_cooldown(id, cast.now);
        let skill = self
            .skills
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SkillRejection::Unknown(id.to_string()))?;

        if remaining > 0 {
            return Err(SkillRejection::OnCooldown {
                skill: id,
                remaining,
            });
        }
        if player.mana < skill.mana_cost {
            return Err(SkillRejection::InsufficientMana {
                skill: id,
                required: skill.mana_cost,
                available: player.mana,
            });
        }

        let (mana_cost, check, execute) = (skill.mana_cost, skill.check, skill.execute);
        let mut ctx = SkillContext {
            now: cast.now,
            level: player.skill_level(id),
            target: cast.target,
            player,
            enemies,
            crit: self.crit.as_mut(),
            sink,
        };
        check(&ctx)?;

        self.last_used.insert(id, cast.now);
        ctx.player.mana -= mana_cost;
        let plan = execute(&mut ctx);
        info!("Used {id} (mana left {})", ctx.player.mana);

        Ok(plan.map(|plan| effects.start(plan, cast.now)))
    }

    /// Activate a skill. Returns `false` and changes nothing when it is
    /// unknown, cooling down, unaffordable, or has no valid target.
    pub fn use_skill(
        &mut self,
        id: SkillId,
        cast: Cast,
        player: &mut Player,
        enemies: &mut [Enemy],
        effects: &mut EffectScheduler,
        sink: &mut dyn DamageSink,
    ) -> bool {
        match self.try_use_skill(id, cast, player, enemies, effects, sink) {
            Ok(_) => true,
            Err(rejection) => {
                debug!("Skill not used: {rejection}");
                false
            },
        }
    }

    /// [`Self::use_skill`] by string id.
    pub fn use_skill_named(
        &mut self,
        name: &str,
        cast: Cast,
        player: &mut Player,
        enemies: &mut [Enemy],
        effects: &mut EffectScheduler,
        sink: &mut dyn DamageSink,
    ) -> bool {
        match name.parse::<SkillId>() {
            Ok(id) => self.use_skill(id, cast, player, enemies, effects, sink),
            Err(rejection) => {
                debug!("Skill not used: {rejection}");
                false
            },
        }
    }
}
