//! Skill point spending.

use thiserror::Error;
use tracing::info;

use crate::player::Player;
use crate::skills::{level_tier, upgrade_cost, SkillId, MAX_SKILL_LEVEL};

/// Why a skill could not be upgraded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    /// Skill is already at the cap
    #[error("{skill} is already at max level {max}")]
    MaxLevel {
        /// Skill that was upgraded
        skill: SkillId,
        /// Level cap
        max: u32,
    },
    /// Not enough unspent points
    #[error("{skill} needs {required} skill points, player has {available}")]
    NotEnoughPoints {
        /// Skill that was upgraded
        skill: SkillId,
        /// Points the upgrade costs
        required: u32,
        /// Points the player has
        available: u32,
    },
}

/// Spend points to raise `skill` by one level. Returns the new level.
pub fn upgrade_skill(player: &mut Player, skill: SkillId) -> Result<u32, ProgressionError> {
    let level = player.skill_level(skill);
    let required = upgrade_cost(level).ok_or(ProgressionError::MaxLevel {
        skill,
        max: MAX_SKILL_LEVEL,
    })?;
    if player.skill_points < required {
        return Err(ProgressionError::NotEnoughPoints {
            skill,
            required,
            available: player.skill_points,
        });
    }

    player.skill_points -= required;
    let next = level + 1;
    player.skill_levels.insert(skill, next);
    info!("{skill} reached level {next} ({})", level_tier(next));
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_spends_points() {
        let mut player = Player::default();
        player.skill_points = 3;
        assert_eq!(upgrade_skill(&mut player, SkillId::Dash), Ok(2));
        assert_eq!(player.skill_points, 2);
        assert_eq!(player.skill_level(SkillId::Dash), 2);
    }

    #[test]
    fn test_upgrade_cost_rises_with_level() {
        let mut player = Player::default().with_skill_level(SkillId::SwordSpin, 10);
        player.skill_points = 1;
        assert_eq!(
            upgrade_skill(&mut player, SkillId::SwordSpin),
            Err(ProgressionError::NotEnoughPoints {
                skill: SkillId::SwordSpin,
                required: 2,
                available: 1
            })
        );
        assert_eq!(player.skill_points, 1);
        assert_eq!(player.skill_level(SkillId::SwordSpin), 10);
    }

    #[test]
    fn test_upgrade_blocked_at_cap() {
        let mut player = Player::default().with_skill_level(SkillId::Berserker, 21);
        player.skill_points = 100;
        assert_eq!(
            upgrade_skill(&mut player, SkillId::Berserker),
            Err(ProgressionError::MaxLevel {
                skill: SkillId::Berserker,
                max: 21
            })
        );
    }

    #[test]
    fn test_full_climb_cost() {
        let mut player = Player::default();
        player.skill_points = 1_000;
        while upgrade_skill(&mut player, SkillId::RedPotion).is_ok() {}
        assert_eq!(player.skill_level(SkillId::RedPotion), 21);
        // 9 levels at 1, 10 at 2, 1 at 3.
        assert_eq!(player.skill_points, 1_000 - (9 + 20 + 3));
    }
}
