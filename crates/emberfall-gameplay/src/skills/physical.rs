//! Physical skills: dash, sword spin, three-way cut, berserker, sword aura.

use std::f32::consts::{FRAC_PI_4, FRAC_PI_6};

use emberfall_common::{distance, normalize, Millis, Vec2};
use tracing::{debug, info};

use super::formulas::{
    berserker_speed_multiplier, dash_crit_chance, dash_damage, sword_aura_damage_multiplier,
    sword_spin_crit_chance, sword_spin_damage, three_way_cut_crit_chance, three_way_cut_damage,
};
use super::{always_ready, SkillContext, SkillDefinition, SkillId, SkillRejection, SkillType};
use crate::effects::{
    CrossCut, DashMotion, DashVisual, EffectKind, EffectPlan, SpinPulse, SpinVisual, TickCadence,
};
use crate::enemy::Knockback;
use crate::player::{Buff, Player};
use crate::status::apply_stun;

/// Maximum distance to a dash target.
pub const DASH_RANGE: f32 = 200.0;
/// How far short of the target the dash stops.
pub const DASH_STOP_SHORT: f32 = 40.0;
/// Dash motion window.
pub const DASH_DURATION: Millis = 200;
/// Knockback applied by a dash hit.
pub const DASH_KNOCKBACK_DISTANCE: f32 = 60.0;
/// Knockback duration.
pub const DASH_KNOCKBACK_DURATION: Millis = 300;

/// Sword spin window.
pub const SPIN_DURATION: Millis = 1_000;
/// Interval between spin pulses.
pub const SPIN_TICK: Millis = 100;

/// Three-way cut reach.
pub const CUT_RANGE: f32 = 150.0;
/// Three-way cut window.
pub const CUT_DURATION: Millis = 1_500;
/// Interval between cuts.
pub const CUT_TICK: Millis = 300;

/// Berserker buff length.
pub const BERSERKER_DURATION: Millis = 10_000;
/// Sword aura buff length.
pub const SWORD_AURA_DURATION: Millis = 15_000;

/// Physical skill definitions in catalog order.
#[must_use]
pub fn catalog() -> Vec<SkillDefinition> {
    vec![
        SkillDefinition {
            id: SkillId::Dash,
            name: "Dash",
            description: "Lunge at a nearby enemy, stunning it and knocking it back.",
            icon: "icons/skills/dash.png",
            cooldown: 3_000,
            mana_cost: 1,
            base_damage: 30,
            skill_type: SkillType::Physical,
            check: check_dash,
            execute: execute_dash,
            damage: Some(dash_damage_for),
            crit_chance: Some(dash_crit_chance_for),
        },
        SkillDefinition {
            id: SkillId::SwordSpin,
            name: "Sword Spin",
            description: "Spin with the blade out, cutting everything nearby.",
            icon: "icons/skills/sword_spin.png",
            cooldown: 8_000,
            mana_cost: 2,
            base_damage: 20,
            skill_type: SkillType::Physical,
            check: check_sword_spin,
            execute: execute_sword_spin,
            damage: Some(sword_spin_damage_for),
            crit_chance: Some(sword_spin_crit_chance_for),
        },
        SkillDefinition {
            id: SkillId::ThreeWayCut,
            name: "Three-Way Cut",
            description: "Slash in three directions at once, again and again.",
            icon: "icons/skills/three_way_cut.png",
            cooldown: 10_000,
            mana_cost: 3,
            base_damage: 5,
            skill_type: SkillType::Physical,
            check: always_ready,
            execute: execute_three_way_cut,
            damage: Some(three_way_cut_damage_for),
            crit_chance: Some(three_way_cut_crit_chance_for),
        },
        SkillDefinition {
            id: SkillId::Berserker,
            name: "Berserker",
            description: "Move faster for a while. Scales with intelligence.",
            icon: "icons/skills/berserker.png",
            cooldown: 30_000,
            mana_cost: 5,
            base_damage: 0,
            skill_type: SkillType::Physical,
            check: always_ready,
            execute: execute_berserker,
            damage: None,
            crit_chance: None,
        },
        SkillDefinition {
            id: SkillId::SwordAura,
            name: "Sword Aura",
            description: "Basic attacks hit harder for a while. Scales with strength.",
            icon: "icons/skills/sword_aura.png",
            cooldown: 30_000,
            mana_cost: 5,
            base_damage: 0,
            skill_type: SkillType::Physical,
            check: always_ready,
            execute: execute_sword_aura,
            damage: None,
            crit_chance: None,
        },
    ]
}

fn dash_damage_for(player: &Player, level: u32, crit: bool) -> u32 {
    dash_damage(level, player.stats.int, crit)
}

fn dash_crit_chance_for(player: &Player, level: u32) -> f32 {
    dash_crit_chance(level, player.stats.int)
}

fn sword_spin_damage_for(player: &Player, level: u32, crit: bool) -> u32 {
    sword_spin_damage(level, player.stats.dex, crit)
}

fn sword_spin_crit_chance_for(_player: &Player, level: u32) -> f32 {
    sword_spin_crit_chance(level)
}

fn three_way_cut_damage_for(player: &Player, level: u32, crit: bool) -> u32 {
    three_way_cut_damage(level, player.stats.vit, player.stats.int, crit)
}

fn three_way_cut_crit_chance_for(player: &Player, level: u32) -> f32 {
    three_way_cut_crit_chance(level, player.stats.int)
}

/// Index of the enemy a dash would hit.
///
/// The player's current target wins when it is alive and in range,
/// otherwise the nearest living enemy in range.
fn dash_target(ctx: &SkillContext<'_>) -> Option<usize> {
    let origin = ctx.player.position;
    let in_range = |e: &crate::enemy::Enemy| {
        e.is_targetable() && distance(origin, e.position) <= DASH_RANGE
    };

    let wanted = ctx.target.or(ctx.player.target_enemy);
    if let Some(idx) = wanted.and_then(|id| ctx.enemies.iter().position(|e| e.id == id)) {
        if in_range(&ctx.enemies[idx]) {
            return Some(idx);
        }
    }

    ctx.enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| in_range(*e))
        .min_by(|(_, a), (_, b)| {
            distance(origin, a.position).total_cmp(&distance(origin, b.position))
        })
        .map(|(idx, _)| idx)
}

fn check_dash(ctx: &SkillContext<'_>) -> Result<(), SkillRejection> {
    match dash_target(ctx) {
        Some(_) => Ok(()),
        None => {
            debug!("Dash has no living enemy within {DASH_RANGE}");
            Err(SkillRejection::NoTarget {
                skill: SkillId::Dash,
            })
        },
    }
}

fn execute_dash(ctx: &mut SkillContext<'_>) -> Option<EffectPlan> {
    let idx = dash_target(ctx)?;
    let level = ctx.level;
    let int = ctx.player.stats.int;
    let crit = ctx.crit.roll(dash_crit_chance(level, int));
    let damage = dash_damage(level, int, crit) as f32;

    let from = ctx.player.position;
    let target_pos = ctx.enemies[idx].position;
    let offset = target_pos - from;
    let dir = match normalize(offset) {
        v if v == Vec2::ZERO => ctx.player.direction,
        v => v,
    };

    let mut enemy = apply_stun(&ctx.enemies[idx], 1_000 + 100 * Millis::from(level), ctx.now);
    let dealt = enemy.take_damage(damage, ctx.now);
    if dealt > 0.0 {
        ctx.sink.report(enemy.id, dealt);
    }
    enemy.knockback = Some(Knockback {
        origin: target_pos,
        direction: dir,
        distance: DASH_KNOCKBACK_DISTANCE,
        start_time: ctx.now,
        duration: DASH_KNOCKBACK_DURATION,
    });
    info!(
        "Dash hit enemy {} for {dealt}{}",
        enemy.id,
        if crit { " (crit)" } else { "" }
    );
    ctx.enemies[idx] = enemy;

    let travel = (offset.length() - DASH_STOP_SHORT).max(0.0);
    ctx.player.face(dir);
    ctx.player.controls_disabled = true;

    Some(EffectPlan {
        skill: SkillId::Dash,
        duration: DASH_DURATION,
        cadence: TickCadence::EveryFrame,
        holds_controls: true,
        kind: EffectKind::Dash(DashMotion {
            from,
            to: from + dir * travel,
            visual: DashVisual {
                trail_length: travel,
                duration: DASH_DURATION,
            },
        }),
    })
}

/// Hit radius of a sword spin at `level`.
#[must_use]
pub fn sword_spin_radius(level: u32) -> f32 {
    100.0 + 5.0 * level as f32
}

fn check_sword_spin(ctx: &SkillContext<'_>) -> Result<(), SkillRejection> {
    let Some(target) = ctx.target else {
        return Ok(());
    };
    let radius = sword_spin_radius(ctx.level);
    let valid = ctx.enemies.iter().any(|e| {
        e.id == target
            && e.is_targetable()
            && distance(ctx.player.position, e.position) <= radius
    });
    if valid {
        Ok(())
    } else {
        debug!("Sword spin target {target} is dead or outside {radius}");
        Err(SkillRejection::NoTarget {
            skill: SkillId::SwordSpin,
        })
    }
}

fn execute_sword_spin(ctx: &mut SkillContext<'_>) -> Option<EffectPlan> {
    let level = ctx.level;
    let crit = ctx.crit.roll(sword_spin_crit_chance(level));
    let damage = sword_spin_damage(level, ctx.player.stats.dex, crit) as f32;
    let radius = sword_spin_radius(level);
    ctx.player.controls_disabled = true;
    info!("Sword spin for {damage}{}", if crit { " (crit)" } else { "" });

    Some(EffectPlan {
        skill: SkillId::SwordSpin,
        duration: SPIN_DURATION,
        cadence: TickCadence::Interval(SPIN_TICK),
        holds_controls: true,
        kind: EffectKind::SwordSpin(SpinPulse {
            radius,
            tick_damage: damage / 10.0,
            finisher_damage: damage,
            visual: SpinVisual {
                radius,
                duration: SPIN_DURATION,
                rotation_speed: 720.0 + 36.0 * level as f32,
            },
        }),
    })
}

fn execute_three_way_cut(ctx: &mut SkillContext<'_>) -> Option<EffectPlan> {
    let facing = match normalize(ctx.player.direction) {
        v if v == Vec2::ZERO => Vec2::Y,
        v => v,
    };
    ctx.player.controls_disabled = true;
    info!("Three-way cut at level {}", ctx.level);

    Some(EffectPlan {
        skill: SkillId::ThreeWayCut,
        duration: CUT_DURATION,
        cadence: TickCadence::Interval(CUT_TICK),
        holds_controls: true,
        kind: EffectKind::ThreeWayCut(CrossCut {
            facing,
            range: CUT_RANGE,
            half_angle: FRAC_PI_6,
            spread: FRAC_PI_4,
            level: ctx.level,
        }),
    })
}

fn execute_berserker(ctx: &mut SkillContext<'_>) -> Option<EffectPlan> {
    let multiplier = berserker_speed_multiplier(ctx.player.stats.int);
    ctx.player.buffs.berserker = Some(Buff::new(ctx.now, BERSERKER_DURATION, multiplier));
    info!("Berserker active: speed x{multiplier}");
    None
}

fn execute_sword_aura(ctx: &mut SkillContext<'_>) -> Option<EffectPlan> {
    let multiplier = sword_aura_damage_multiplier(ctx.player.stats.str);
    ctx.player.buffs.sword_aura = Some(Buff::new(ctx.now, SWORD_AURA_DURATION, multiplier));
    info!("Sword aura active: damage x{multiplier}");
    None
}
