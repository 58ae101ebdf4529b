//! Game session: the world plus every system that mutates it.
//!
//! The host calls [`GameSession::frame`] once per animation frame. A frame
//! advances active skill effects, runs the movement loop, fires a held skill
//! hotkey, moves knocked-back enemies, and drops a dead target, in that order.
//! Every step works on drafts and commits through [`World`].

use emberfall_common::{EnemyId, Millis, Vec2};
use tracing::{debug, info};

use crate::camera::Camera;
use crate::config::GameConfig;
use crate::effects::{EffectHandle, EffectScheduler, EffectTargets};
use crate::enemy::Enemy;
use crate::events::{EventBus, GameEvent};
use crate::input::KeyState;
use crate::movement::{FrameInput, MovementLoop, TickOutcome};
use crate::player::Player;
use crate::progression::{upgrade_skill, ProgressionError};
use crate::selector::{EnemySelector, Selection};
use crate::skills::{Cast, SkillId, SkillManager, SkillRejection};
use crate::terrain::{MapContext, MapId};
use crate::world::World;

/// What one [`GameSession::frame`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    /// Movement loop result
    pub tick: TickOutcome,
    /// Effect sessions that finished this frame
    pub completed_effects: Vec<EffectHandle>,
    /// Skill fired from a held hotkey
    pub skill_used: Option<SkillId>,
    /// Enemies moved by knockback
    pub knocked_back: usize,
    /// The target died or vanished and was dropped
    pub target_cleared: bool,
}

/// A running game.
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    world: World,
    frames: MovementLoop,
    skills: SkillManager,
    effects: EffectScheduler,
    selector: EnemySelector,
    bus: EventBus,
}

impl GameSession {
    /// Start a session around `player`.
    #[must_use]
    pub fn new(config: GameConfig, player: Player) -> Self {
        let mut camera = Camera::from_config(&config.camera);
        camera.center_on(player.position, &config.bounds);
        Self {
            world: World::new(player, camera),
            frames: MovementLoop::new(config.clone()),
            skills: SkillManager::new(),
            effects: EffectScheduler::new(),
            selector: EnemySelector::new(config.selector),
            bus: EventBus::default(),
            config,
        }
    }

    /// Replace the skill manager (custom catalog or crit source).
    #[must_use]
    pub fn with_skill_manager(mut self, skills: SkillManager) -> Self {
        self.skills = skills;
        self
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Committed world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Skill registry and cooldowns.
    #[must_use]
    pub fn skills(&self) -> &SkillManager {
        &self.skills
    }

    /// Mutable skill registry, for cooldown resets.
    pub fn skills_mut(&mut self) -> &mut SkillManager {
        &mut self.skills
    }

    /// Active effect sessions.
    #[must_use]
    pub fn effects(&self) -> &EffectScheduler {
        &self.effects
    }

    /// Movement loop, for the active hitbox.
    #[must_use]
    pub fn movement(&self) -> &MovementLoop {
        &self.frames
    }

    /// Take every event published since the last drain.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.bus.drain()
    }

    /// Add an enemy to the world.
    pub fn spawn_enemy(&mut self, enemy: Enemy) -> EnemyId {
        self.world.spawn_enemy(enemy)
    }

    /// Remove an enemy from the world.
    pub fn despawn_enemy(&mut self, id: EnemyId) -> bool {
        self.world.despawn_enemy(id)
    }

    /// Run one animation frame.
    pub fn frame(&mut self, now: Millis, keys: &KeyState, map: MapContext<'_>) -> FrameSummary {
        let completed_effects = self.advance_effects(now);

        let sender = self.bus.sender();
        let mut sink = self.bus.sender();
        let input = FrameInput { now, keys, map };
        let tick = self.frames.tick(&input, &mut self.world, &sender, &mut sink);

        let mut skill_used = None;
        if tick.ran() {
            if let Some(skill) = keys.held_hotkey().and_then(|i| SkillId::ALL.get(i).copied()) {
                match self.use_skill(skill, Cast::at(now), map.map) {
                    Ok(_) => skill_used = Some(skill),
                    Err(rejection) => debug!("Hotkey {skill} ignored: {rejection}"),
                }
            }
        }

        let knocked_back = self.world.advance_knockbacks(now, &self.config.bounds);
        let target_cleared = self.clear_dead_target();

        FrameSummary {
            tick,
            completed_effects,
            skill_used,
            knocked_back,
            target_cleared,
        }
    }

    /// Activate a skill on `map`.
    ///
    /// Villages forbid skills, and a mounted player may only drink potions.
    /// A rejected activation changes nothing.
    pub fn use_skill(
        &mut self,
        skill: SkillId,
        cast: Cast,
        map: MapId,
    ) -> Result<Option<EffectHandle>, SkillRejection> {
        let player = self.world.player();
        if !map.allows_combat() {
            return Err(SkillRejection::CombatDisabled);
        }
        if player.controls_disabled {
            return Err(SkillRejection::ControlsDisabled);
        }
        if player.is_mounted() && skill != SkillId::RedPotion {
            return Err(SkillRejection::Mounted { skill });
        }

        let mut player = player.clone();
        let before = self.world.enemies().to_vec();
        let mut enemies = before.clone();
        let mut sink = self.bus.sender();
        let handle = self.skills.try_use_skill(
            skill,
            cast,
            &mut player,
            &mut enemies,
            &mut self.effects,
            &mut sink,
        )?;

        self.bus.publish(GameEvent::SkillActivated { skill });
        self.publish_defeats(&before, &enemies);
        self.commit_player_and_follow(player);
        self.world.commit_enemies(enemies);
        Ok(handle)
    }

    /// Handle a click at a world position.
    pub fn select_at(&mut self, point: Vec2) -> Selection {
        let mut player = self.world.player().clone();
        let mut enemies = self.world.enemies().to_vec();
        let selection = self.selector.select_at(point, &mut player, &mut enemies);
        self.bus.publish(GameEvent::EnemySelected {
            target: player.target_enemy,
        });
        self.world.commit_player(player);
        self.world.commit_enemies(enemies);
        selection
    }

    /// Handle a click at a screen position.
    pub fn click(&mut self, screen: Vec2) -> Selection {
        let point = self.world.camera().screen_to_world(screen);
        self.select_at(point)
    }

    /// Target the next enemy in range.
    pub fn cycle_target(&mut self) -> Option<EnemyId> {
        let mut player = self.world.player().clone();
        let mut enemies = self.world.enemies().to_vec();
        let target = self.selector.cycle_target(&mut player, &mut enemies);
        self.bus.publish(GameEvent::EnemySelected { target });
        self.world.commit_player(player);
        self.world.commit_enemies(enemies);
        target
    }

    /// Flip auto-attack on the current target. Returns the new state.
    pub fn toggle_auto_attack(&mut self) -> bool {
        let mut player = self.world.player().clone();
        let enabled = self.selector.toggle_auto_attack(&mut player, self.world.enemies());
        self.world.commit_player(player);
        enabled
    }

    /// Spend skill points on `skill`. Returns the new level.
    pub fn upgrade_skill(&mut self, skill: SkillId) -> Result<u32, ProgressionError> {
        let mut player = self.world.player().clone();
        let level = upgrade_skill(&mut player, skill)?;
        self.world.commit_player(player);
        Ok(level)
    }

    /// Resize the viewport and recenter on the player.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        let mut camera = *self.world.camera();
        camera.set_viewport(width, height);
        camera.center_on(self.world.player().position, &self.config.bounds);
        self.world.commit_camera(camera);
    }

    /// Stop an effect early. Its remaining ticks never run.
    ///
    /// Controls come back once no other effect holds them.
    pub fn cancel_effect(&mut self, handle: EffectHandle) -> bool {
        if !self.effects.cancel(handle) {
            return false;
        }
        if self.world.player().controls_disabled && !self.effects.holds_controls() {
            let mut player = self.world.player().clone();
            player.controls_disabled = false;
            self.world.commit_player(player);
        }
        true
    }

    /// Drop every effect session. Returns how many were running.
    pub fn shutdown(&mut self) -> usize {
        let disposed = self.effects.dispose_all();
        info!("Session shut down, {disposed} effects disposed");
        disposed
    }

    fn advance_effects(&mut self, now: Millis) -> Vec<EffectHandle> {
        if self.effects.active_count() == 0 {
            return Vec::new();
        }
        let mut player = self.world.player().clone();
        let before = self.world.enemies().to_vec();
        let mut enemies = before.clone();
        let mut sink = self.bus.sender();
        let completed = {
            let mut targets = EffectTargets {
                player: &mut player,
                enemies: &mut enemies,
                crit: self.skills.crit_roll(),
                sink: &mut sink,
            };
            self.effects.advance(now, &mut targets)
        };
        self.publish_defeats(&before, &enemies);
        self.commit_player_and_follow(player);
        self.world.commit_enemies(enemies);
        completed
    }

    /// Commit a player draft, recentring the camera if it moved.
    fn commit_player_and_follow(&mut self, player: Player) {
        if player.position != self.world.player().position {
            let mut camera = *self.world.camera();
            camera.center_on(player.position, &self.config.bounds);
            self.world.commit_camera(camera);
        }
        self.world.commit_player(player);
    }

    fn clear_dead_target(&mut self) -> bool {
        let mut player = self.world.player().clone();
        let mut enemies = self.world.enemies().to_vec();
        if !EnemySelector::clear_dead_target(&mut player, &mut enemies) {
            return false;
        }
        self.bus.publish(GameEvent::EnemySelected { target: None });
        self.world.commit_player(player);
        self.world.commit_enemies(enemies);
        true
    }

    fn publish_defeats(&self, before: &[Enemy], after: &[Enemy]) {
        for enemy in after.iter().filter(|e| e.is_dead()) {
            let was_alive = before.iter().any(|b| b.id == enemy.id && !b.is_dead());
            if was_alive {
                self.bus.publish(GameEvent::EnemyDefeated { target: enemy.id });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::player::{Mount, MountKind};
    use crate::skills::NeverCrit;

    fn session(player: Player) -> GameSession {
        GameSession::new(GameConfig::default(), player)
            .with_skill_manager(SkillManager::new().with_crit_roll(Box::new(NeverCrit)))
    }

    fn wilderness() -> MapContext<'static> {
        MapContext::open(MapId::Wilderness)
    }

    fn horse() -> Mount {
        Mount {
            active: true,
            kind: MountKind::Horse,
            speed_bonus: 1.5,
        }
    }

    #[test]
    fn test_frame_moves_player() {
        let mut game = session(Player::new(Vec2::new(500.0, 500.0)));
        let mut keys = KeyState::new();
        keys.set(Key::S, true);
        let summary = game.frame(1_000, &keys, wilderness());
        assert!(summary.tick.ran());
        assert_eq!(game.world().player().position, Vec2::new(500.0, 504.0));
    }

    #[test]
    fn test_dash_hotkey_runs_to_completion() {
        let mut game = session(Player::new(Vec2::new(500.0, 500.0)));
        let id = game.spawn_enemy(Enemy::new(Vec2::new(600.0, 500.0), 100.0));
        let mut keys = KeyState::new();
        keys.set(Key::Digit1, true);

        let summary = game.frame(1_000, &keys, wilderness());
        assert_eq!(summary.skill_used, Some(SkillId::Dash));
        assert!(game.world().player().controls_disabled);
        assert_eq!(game.world().player().mana, 49);
        assert_eq!(game.world().enemy(id).and_then(|e| e.health.current()), Some(68.0));
        assert_eq!(game.effects().active_count(), 1);

        let summary = game.frame(1_100, &keys, wilderness());
        assert_eq!(summary.tick, TickOutcome::ControlsDisabled);
        assert_eq!(game.world().player().position, Vec2::new(530.0, 500.0));
        assert!(summary.knocked_back > 0);

        let summary = game.frame(1_200, &keys, wilderness());
        assert_eq!(summary.completed_effects.len(), 1);
        assert!(!game.world().player().controls_disabled);
        assert_eq!(game.world().player().position, Vec2::new(560.0, 500.0));
        // Still on cooldown, so the held key does nothing.
        assert_eq!(summary.skill_used, None);

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::SkillActivated {
            skill: SkillId::Dash
        }));
        assert!(events.contains(&GameEvent::DamageDealt {
            target: id,
            amount: 32.0
        }));
    }

    #[test]
    fn test_dash_recenters_camera() {
        let mut game = session(Player::new(Vec2::new(1_000.0, 900.0)));
        game.spawn_enemy(Enemy::new(Vec2::new(1_190.0, 900.0), 500.0));
        let start = game.world().camera().position;
        assert_eq!(start, Vec2::new(360.0, 540.0));

        game.use_skill(SkillId::Dash, Cast::at(1_000), MapId::Wilderness)
            .expect("dash");
        let keys = KeyState::new();
        game.frame(1_100, &keys, wilderness());
        game.frame(1_250, &keys, wilderness());

        let player = game.world().player().position;
        assert_eq!(player, Vec2::new(1_150.0, 900.0));
        let mut expected = *game.world().camera();
        expected.center_on(player, &game.config().bounds);
        assert_eq!(game.world().camera().position, expected.position);
        assert_eq!(game.world().camera().position, Vec2::new(510.0, 540.0));
    }

    #[test]
    fn test_skill_kill_reports_defeat() {
        let mut game = session(Player::new(Vec2::new(500.0, 500.0)));
        let id = game.spawn_enemy(Enemy::new(Vec2::new(600.0, 500.0), 20.0));
        game.use_skill(SkillId::Dash, Cast::at(1_000), MapId::Wilderness)
            .expect("dash");
        assert!(game
            .drain_events()
            .contains(&GameEvent::EnemyDefeated { target: id }));
    }

    #[test]
    fn test_mounted_player_only_drinks() {
        let mut player = Player::new(Vec2::new(500.0, 500.0)).with_mount(horse());
        player.health = 50.0;
        let mut game = session(player);
        game.spawn_enemy(Enemy::new(Vec2::new(600.0, 500.0), 100.0));

        assert_eq!(
            game.use_skill(SkillId::Dash, Cast::at(1_000), MapId::Wilderness),
            Err(SkillRejection::Mounted {
                skill: SkillId::Dash
            })
        );
        assert_eq!(game.world().player().mana, 50);
        assert_eq!(
            game.use_skill(SkillId::RedPotion, Cast::at(1_000), MapId::Wilderness),
            Ok(None)
        );
        assert_eq!(game.world().player().health, 55.0);
    }

    #[test]
    fn test_village_forbids_skills() {
        let mut game = session(Player::new(Vec2::new(500.0, 500.0)));
        assert_eq!(
            game.use_skill(SkillId::Berserker, Cast::at(1_000), MapId::Village),
            Err(SkillRejection::CombatDisabled)
        );
        assert!(game.world().player().buffs.berserker.is_none());
    }

    #[test]
    fn test_cancel_restores_controls_without_moving() {
        let mut game = session(Player::new(Vec2::new(500.0, 500.0)));
        game.spawn_enemy(Enemy::new(Vec2::new(600.0, 500.0), 100.0));
        let handle = game
            .use_skill(SkillId::Dash, Cast::at(1_000), MapId::Wilderness)
            .expect("dash")
            .expect("dash session");

        assert!(game.cancel_effect(handle));
        assert!(!game.cancel_effect(handle));
        assert!(!game.world().player().controls_disabled);

        game.frame(1_200, &KeyState::new(), wilderness());
        assert_eq!(game.world().player().position, Vec2::new(500.0, 500.0));
    }

    #[test]
    fn test_shutdown_disposes_sessions() {
        let mut game = session(Player::new(Vec2::new(500.0, 500.0)));
        game.spawn_enemy(Enemy::new(Vec2::new(550.0, 500.0), 1_000.0));
        game.use_skill(SkillId::SwordSpin, Cast::at(1_000), MapId::Wilderness)
            .expect("spin");
        assert_eq!(game.shutdown(), 1);
        assert_eq!(game.effects().active_count(), 0);
    }

    #[test]
    fn test_vanished_target_cleared_on_frame() {
        let mut game = session(Player::new(Vec2::new(500.0, 500.0)));
        let id = game.spawn_enemy(Enemy::new(Vec2::new(600.0, 500.0), 100.0));
        assert_eq!(game.select_at(Vec2::new(600.0, 500.0)), Selection::Targeted(id));
        assert!(game.toggle_auto_attack());
        game.drain_events();

        game.despawn_enemy(id);
        let summary = game.frame(1_000, &KeyState::new(), wilderness());
        assert!(summary.target_cleared);
        assert_eq!(game.world().player().target_enemy, None);
        assert!(!game.world().player().auto_attacking);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::EnemySelected { target: None }]
        );
    }

    #[test]
    fn test_click_uses_camera() {
        let mut game = session(Player::new(Vec2::new(1_000.0, 1_000.0)));
        let id = game.spawn_enemy(Enemy::new(Vec2::new(1_000.0, 1_000.0), 100.0));
        // The camera centres the player in a 1280x720 viewport.
        assert_eq!(game.click(Vec2::new(640.0, 360.0)), Selection::Targeted(id));
    }

    #[test]
    fn test_cycle_and_upgrade() {
        let mut player = Player::new(Vec2::new(500.0, 500.0));
        player.skill_points = 1;
        let mut game = session(player);
        let id = game.spawn_enemy(Enemy::new(Vec2::new(550.0, 500.0), 100.0));
        assert_eq!(game.cycle_target(), Some(id));
        assert_eq!(game.upgrade_skill(SkillId::Dash), Ok(2));
        assert_eq!(game.world().player().skill_points, 0);
        assert!(game.upgrade_skill(SkillId::Dash).is_err());
    }
}
