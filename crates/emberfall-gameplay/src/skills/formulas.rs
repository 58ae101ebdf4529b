//! Damage, crit, and buff formulas.
//!
//! All arithmetic is done in `f64` in the order written so that integer
//! results match the floored values the game has always shown.

/// Skill level cap.
pub const MAX_SKILL_LEVEL: u32 = 21;

/// Berserker speed multiplier by INT threshold.
pub const BERSERKER_SPEED: [(u32, f32); 5] =
    [(20, 1.30), (15, 1.26), (10, 1.22), (5, 1.18), (0, 1.15)];

/// Sword aura damage multiplier by STR threshold.
pub const SWORD_AURA_DAMAGE: [(u32, f32); 5] =
    [(20, 1.40), (15, 1.35), (10, 1.30), (5, 1.25), (0, 1.20)];

/// Red potion heal by level threshold; below the last threshold heals 5.
pub const RED_POTION_HEAL: [(u32, f32); 5] =
    [(90, 30.0), (70, 25.0), (50, 20.0), (30, 15.0), (10, 10.0)];

fn floor_div(value: u32, divisor: u32) -> f64 {
    f64::from(value / divisor)
}

fn crit_multiplier(crit: bool, multiplier: f64) -> f64 {
    if crit {
        multiplier
    } else {
        1.0
    }
}

/// Dash hit damage.
#[must_use]
pub fn dash_damage(level: u32, int: u32, crit: bool) -> u32 {
    let l = f64::from(level);
    let base = 30.0 + 2.0 * l;
    let int_bonus = (floor_div(int, 3) * (1.0 + l / 8.0)).min(25.0);
    let level_mult = 1.0 + floor_div(level, 3) * 0.12;
    ((base + int_bonus) * level_mult * crit_multiplier(crit, 1.7)).floor() as u32
}

/// Dash crit chance in percent.
#[must_use]
pub fn dash_crit_chance(level: u32, int: u32) -> f32 {
    (8 + level / 2 + int / 4).min(40) as f32
}

/// Sword spin nominal damage.
#[must_use]
pub fn sword_spin_damage(level: u32, dex: u32, crit: bool) -> u32 {
    let l = f64::from(level);
    let base = 20.0 + 2.0 * l;
    let dex_bonus = (floor_div(dex, 3) * 3.0).min(30.0);
    let level_mult = 1.0 + floor_div(level, 5) * 0.1;
    ((base + dex_bonus) * level_mult * crit_multiplier(crit, 1.5)).floor() as u32
}

/// Sword spin crit chance in percent.
#[must_use]
pub fn sword_spin_crit_chance(level: u32) -> f32 {
    (5 + level / 2).min(30) as f32
}

/// Three-way cut damage per tick.
#[must_use]
pub fn three_way_cut_damage(level: u32, vit: u32, int: u32, crit: bool) -> u32 {
    let l = f64::from(level);
    let base = 5.0 + 1.5 * l;
    let vit_bonus = (floor_div(vit, 4) * (1.0 + l / 10.0)).min(15.0);
    let int_bonus = (floor_div(int, 4) * (1.0 + l / 10.0)).min(15.0);
    let level_mult = 1.0 + floor_div(level, 4) * 0.15;
    ((base + vit_bonus + int_bonus) * level_mult * crit_multiplier(crit, 1.6)).floor() as u32
}

/// Three-way cut crit chance in percent.
#[must_use]
pub fn three_way_cut_crit_chance(level: u32, int: u32) -> f32 {
    (5 + level / 3 + int / 5).min(35) as f32
}

fn step_lookup(table: &[(u32, f32)], value: u32, fallback: f32) -> f32 {
    table
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(fallback, |(_, v)| *v)
}

/// Berserker speed multiplier for an INT value.
#[must_use]
pub fn berserker_speed_multiplier(int: u32) -> f32 {
    step_lookup(&BERSERKER_SPEED, int, 1.15)
}

/// Sword aura damage multiplier for a STR value.
#[must_use]
pub fn sword_aura_damage_multiplier(str: u32) -> f32 {
    step_lookup(&SWORD_AURA_DAMAGE, str, 1.20)
}

/// Red potion heal for a skill level.
#[must_use]
pub fn red_potion_heal(level: u32) -> f32 {
    step_lookup(&RED_POTION_HEAL, level, 5.0)
}

/// UI tier label: M1..M10, G1..G10, then P at the cap.
#[must_use]
pub fn level_tier(level: u32) -> String {
    match level {
        0..=10 => format!("M{}", level.max(1)),
        11..=20 => format!("G{}", level - 10),
        _ => "P".to_string(),
    }
}

/// Skill points needed to raise a skill from `level`, `None` at the cap.
#[must_use]
pub fn upgrade_cost(level: u32) -> Option<u32> {
    match level {
        l if l >= MAX_SKILL_LEVEL => None,
        l if l < 10 => Some(1),
        l if l < 20 => Some(2),
        _ => Some(3),
    }
}
