//! Per-frame movement and melee loop.
//!
//! The host calls [`MovementLoop::tick`] on every animation frame. Frames that
//! arrive sooner than the configured interval after the last effective one
//! are no-ops. An effective frame reads the pressed keys, moves the player,
//! runs the basic attack combo, follows the player with the camera, and
//! commits whatever changed in one go.

use emberfall_common::{distance, elapsed, normalize, EnemyId, Millis, Vec2};
use tracing::debug;

use crate::attack::{basic_attack_damage, next_sequence, resolve_swing, Hitbox, SwingHit};
use crate::collision::resolve_movement;
use crate::config::{CombatConfig, GameConfig, MovementConfig};
use crate::enemy::Enemy;
use crate::events::{DamageSink, EventSender, GameEvent, SoundCue};
use crate::input::{Key, KeyState};
use crate::player::Player;
use crate::terrain::MapContext;
use crate::world::World;

/// Inputs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Frame time
    pub now: Millis,
    /// Keys held this frame
    pub keys: &'a KeyState,
    /// Current map and its obstruction source
    pub map: MapContext<'a>,
}

/// A basic attack started this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SwingReport {
    /// Combo step of the swing
    pub sequence: u8,
    /// Damage of each hit before clamping
    pub damage: f32,
    /// Enemies struck
    pub hits: Vec<SwingHit>,
}

/// What an effective frame did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Player position changed
    pub moved: bool,
    /// A swing started
    pub swing: Option<SwingReport>,
    /// Player state was committed
    pub player_committed: bool,
    /// Enemy state was committed
    pub enemies_committed: bool,
}

/// Result of a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Too soon after the last effective frame
    Throttled,
    /// A skill holds the controls; input was ignored
    ControlsDisabled,
    /// Input was processed
    Ran(FrameReport),
}

impl TickOutcome {
    /// Whether input was processed.
    #[must_use]
    pub fn ran(&self) -> bool {
        matches!(self, Self::Ran(_))
    }
}

/// Effective movement speed for one frame, before collision slowdown.
///
/// A mount replaces both the post-swing slowdown and the berserker buff.
#[must_use]
pub fn effective_speed(
    player: &Player,
    now: Millis,
    movement: &MovementConfig,
    combat: &CombatConfig,
) -> f32 {
    let modifier = match player.mount.filter(|m| m.active) {
        Some(mount) => mount.speed_bonus,
        None => {
            let recovering = player.attack_sequence != 0
                && elapsed(now, player.last_attack_time)
                    < combat.attack_duration_ms + movement.attack_slowdown_ms;
            let slowdown = if recovering {
                movement.attack_slowdown
            } else {
                1.0
            };
            slowdown * player.buffs.berserker_multiplier(now)
        },
    };
    movement.base_speed * modifier * player.movement_speed_multiplier
}

/// Frame loop state that persists between frames.
#[derive(Debug, Clone)]
pub struct MovementLoop {
    config: GameConfig,
    last_frame: Option<Millis>,
    last_walk_sound: Option<Millis>,
    hitbox: Option<Hitbox>,
}

impl MovementLoop {
    /// Creates a loop with the given tuning.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            last_frame: None,
            last_walk_sound: None,
            hitbox: None,
        }
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Hitbox of the swing in progress, for debug drawing.
    #[must_use]
    pub fn active_hitbox(&self) -> Option<&Hitbox> {
        self.hitbox.as_ref()
    }

    /// Run one frame.
    pub fn tick(
        &mut self,
        input: &FrameInput<'_>,
        world: &mut World,
        events: &EventSender,
        sink: &mut dyn DamageSink,
    ) -> TickOutcome {
        let now = input.now;
        if let Some(last) = self.last_frame {
            if elapsed(now, last) < self.config.movement.frame_interval_ms {
                return TickOutcome::Throttled;
            }
        }
        self.last_frame = Some(now);

        if world.player().controls_disabled {
            return TickOutcome::ControlsDisabled;
        }

        let combat = self.config.combat;
        let mut player = world.player().clone();
        let mut report = FrameReport::default();
        let attack_active =
            player.is_attacking && elapsed(now, player.last_attack_time) < combat.attack_duration_ms;

        let space = input.keys.is_pressed(Key::Space);
        let mut intent = input.keys.movement_intent();
        let mut auto_swing = false;
        if player.auto_attacking && !space && intent == Vec2::ZERO {
            if let Some(target) = auto_attack_target(&player, world.enemies()) {
                let offset = target.position - player.position;
                if distance(player.position, target.position) > combat.auto_attack_range {
                    intent = normalize(offset);
                } else {
                    player.face(offset);
                    auto_swing = true;
                }
            }
        }

        if intent != Vec2::ZERO {
            player.face(intent);
        }

        if intent != Vec2::ZERO && !attack_active {
            let speed = effective_speed(&player, now, &self.config.movement, &combat);
            let resolution = resolve_movement(
                player.position,
                intent,
                speed,
                world.enemies(),
                &self.config.collision,
                &self.config.bounds,
                &input.map,
            );
            report.moved = resolution.position != player.position;
            player.position = resolution.position;
        }
        player.is_moving = report.moved;

        let wants_swing = (space || auto_swing) && input.map.map.allows_combat();
        let mut enemies_draft: Option<Vec<Enemy>> = None;
        if wants_swing && !attack_active {
            if space {
                player.auto_attacking = false;
            }
            let mut enemies = world.enemies().to_vec();
            report.swing = Some(self.swing(&mut player, &mut enemies, now, events, sink));
            enemies_draft = Some(enemies);
        } else if player.is_attacking && !attack_active {
            player.is_attacking = false;
            self.hitbox = None;
        }

        if !player.is_attacking
            && player.attack_sequence != 0
            && elapsed(now, player.last_attack_time) >= combat.sequence_reset_ms
        {
            debug!("Combo reset after {}ms idle", elapsed(now, player.last_attack_time));
            player.attack_sequence = 0;
        }

        if report.moved {
            let mut camera = *world.camera();
            camera.center_on(player.position, &self.config.bounds);
            world.commit_camera(camera);
            self.walk_sound(now, events);
        }

        report.player_committed = world.commit_player(player);
        if let Some(enemies) = enemies_draft {
            report.enemies_committed = world.commit_enemies(enemies);
        }
        TickOutcome::Ran(report)
    }

    /// Start the next combo step and apply its hits.
    fn swing(
        &mut self,
        player: &mut Player,
        enemies: &mut [Enemy],
        now: Millis,
        events: &EventSender,
        sink: &mut dyn DamageSink,
    ) -> SwingReport {
        let combat = &self.config.combat;
        player.attack_sequence = next_sequence(player.attack_sequence);
        player.is_attacking = true;
        player.last_attack_time = now;

        let sequence = player.attack_sequence;
        let hitbox = Hitbox::for_swing(player.position, player.direction, sequence, combat.hitbox_offset);
        let damage = basic_attack_damage(player, sequence, now, combat);
        let hits = resolve_swing(&hitbox, damage, enemies, now, sink);
        self.hitbox = Some(hitbox);

        events.sound(SoundCue::Swing);
        for hit in hits.iter().filter(|h| h.killed) {
            events.publish(GameEvent::EnemyDefeated { target: hit.target });
        }
        debug!("Swing {sequence} for {damage}, {} hits", hits.len());

        SwingReport {
            sequence,
            damage,
            hits,
        }
    }

    fn walk_sound(&mut self, now: Millis, events: &EventSender) {
        let due = self.last_walk_sound.map_or(true, |last| {
            elapsed(now, last) >= self.config.movement.walk_sound_interval_ms
        });
        if due {
            events.sound(SoundCue::Walk);
            self.last_walk_sound = Some(now);
        }
    }
}

fn auto_attack_target<'e>(player: &Player, enemies: &'e [Enemy]) -> Option<&'e Enemy> {
    let id: EnemyId = player.target_enemy?;
    enemies.iter().find(|e| e.id == id && e.is_targetable())
}
