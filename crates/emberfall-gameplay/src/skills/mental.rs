//! Mental skills.

use tracing::info;

use super::formulas::red_potion_heal;
use super::{always_ready, SkillContext, SkillDefinition, SkillId, SkillType};
use crate::effects::EffectPlan;

/// Mental skill definitions in catalog order.
#[must_use]
pub fn catalog() -> Vec<SkillDefinition> {
    vec![SkillDefinition {
        id: SkillId::RedPotion,
        name: "Red Potion",
        description: "Restore health. Heals more at higher levels.",
        icon: "icons/skills/red_potion.png",
        cooldown: 1_000,
        mana_cost: 0,
        base_damage: 0,
        skill_type: SkillType::Mental,
        check: always_ready,
        execute: execute_red_potion,
        damage: None,
        crit_chance: None,
    }]
}

fn execute_red_potion(ctx: &mut SkillContext<'_>) -> Option<EffectPlan> {
    let restored = ctx.player.heal(red_potion_heal(ctx.level));
    info!(
        "Red potion restored {restored} health ({}/{})",
        ctx.player.health, ctx.player.max_health
    );
    None
}
