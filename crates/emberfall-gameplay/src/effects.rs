//! Time-extended skill effects.
//!
//! A skill that plays out over time (dash motion, sword spin, three-way cut)
//! hands the scheduler an [`EffectPlan`]. The scheduler turns it into an
//! [`EffectSession`] and drives its ticks from [`EffectScheduler::advance`].
//! Cancelling or disposing a session drops it on the spot, so nothing it
//! would have done later can touch the world.

use emberfall_common::{distance, elapsed, normalize, rotate, Millis, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::enemy::Enemy;
use crate::events::DamageSink;
use crate::player::Player;
use crate::skills::{three_way_cut_crit_chance, three_way_cut_damage, CritRoll, SkillId};

/// Opaque handle to one effect session. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectHandle(u64);

impl EffectHandle {
    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// How often a session ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickCadence {
    /// Every call to `advance`
    EveryFrame,
    /// At `start + n * interval` for `n >= 1` within the window
    Interval(Millis),
}

/// Presentation parameters for the dash trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashVisual {
    /// Trail length in pixels
    pub trail_length: f32,
    /// How long the trail stays visible
    pub duration: Millis,
}

/// Presentation parameters for the spin ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinVisual {
    /// Ring radius in pixels
    pub radius: f32,
    /// How long the ring is shown
    pub duration: Millis,
    /// Degrees per second
    pub rotation_speed: f32,
}

/// Player motion during a dash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashMotion {
    /// Where the dash started
    pub from: Vec2,
    /// Where it ends
    pub to: Vec2,
    /// Trail parameters
    pub visual: DashVisual,
}

impl DashMotion {
    /// Player position at `progress` in `0.0..=1.0`.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Vec2 {
        self.from.lerp(self.to, progress.clamp(0.0, 1.0))
    }
}

/// Area damage pulses around the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinPulse {
    /// Hit radius around the player
    pub radius: f32,
    /// Damage per interval tick
    pub tick_damage: f32,
    /// Damage of the closing hit
    pub finisher_damage: f32,
    /// Ring parameters
    pub visual: SpinVisual,
}

/// Three cones of cuts in front of the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossCut {
    /// Facing at cast time
    pub facing: Vec2,
    /// Reach in pixels
    pub range: f32,
    /// Half-width of each cone in radians
    pub half_angle: f32,
    /// Angle between the center cone and each side cone in radians
    pub spread: f32,
    /// Skill level at cast time
    pub level: u32,
}

impl CrossCut {
    /// Whether `point` falls in one of the cones from `origin`.
    #[must_use]
    pub fn covers(&self, origin: Vec2, point: Vec2) -> bool {
        let offset = point - origin;
        if offset.length() > self.range {
            return false;
        }
        let dir = normalize(offset);
        if dir == Vec2::ZERO {
            return true;
        }
        let min_cos = self.half_angle.cos();
        [0.0, self.spread, -self.spread]
            .iter()
            .any(|angle| dir.dot(rotate(self.facing, *angle)) >= min_cos)
    }
}

/// What a session does on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Move the player along a dash
    Dash(DashMotion),
    /// Damage everything around the player, then a finisher
    SwordSpin(SpinPulse),
    /// Damage everything in three forward cones
    ThreeWayCut(CrossCut),
}

/// Description of a time-extended effect produced by a skill cast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectPlan {
    /// Skill that produced the effect
    pub skill: SkillId,
    /// Length of the active window
    pub duration: Millis,
    /// Tick schedule
    pub cadence: TickCadence,
    /// Whether player controls stay disabled for the window
    pub holds_controls: bool,
    /// Tick behavior
    pub kind: EffectKind,
}

/// A running effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSession {
    /// Handle for cancellation
    pub handle: EffectHandle,
    /// Skill that produced it
    pub skill: SkillId,
    /// Activation time
    pub start_time: Millis,
    /// Length of the active window
    pub duration: Millis,
    /// Tick schedule
    pub cadence: TickCadence,
    /// Ticks run so far
    pub tick_count: u32,
    /// Next interval tick
    pub next_tick_at: Millis,
    /// Whether player controls stay disabled for the window
    pub holds_controls: bool,
    /// Tick behavior
    pub kind: EffectKind,
}

impl EffectSession {
    /// End of the active window.
    #[must_use]
    pub fn end_time(&self) -> Millis {
        self.start_time + self.duration
    }

    /// Fraction of the window elapsed at `now`, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self, now: Millis) -> f32 {
        if self.duration == 0 {
            return 1.0;
        }
        (elapsed(now, self.start_time) as f32 / self.duration as f32).min(1.0)
    }
}

/// World drafts an effect tick may mutate.
pub struct EffectTargets<'a> {
    /// Player draft
    pub player: &'a mut Player,
    /// Enemy drafts
    pub enemies: &'a mut [Enemy],
    /// Crit source
    pub crit: &'a mut dyn CritRoll,
    /// Damage report channel
    pub sink: &'a mut dyn DamageSink,
}

/// Owns every running effect session.
#[derive(Debug, Default)]
pub struct EffectScheduler {
    sessions: Vec<EffectSession>,
    next_handle: u64,
}

impl EffectScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `plan` at `now`.
    pub fn start(&mut self, plan: EffectPlan, now: Millis) -> EffectHandle {
        self.next_handle += 1;
        let handle = EffectHandle(self.next_handle);
        let next_tick_at = match plan.cadence {
            TickCadence::EveryFrame => now,
            TickCadence::Interval(interval) => now + interval,
        };
        self.sessions.push(EffectSession {
            handle,
            skill: plan.skill,
            start_time: now,
            duration: plan.duration,
            cadence: plan.cadence,
            tick_count: 0,
            next_tick_at,
            holds_controls: plan.holds_controls,
            kind: plan.kind,
        });
        debug!("Started {} effect {:?}", plan.skill, handle);
        handle
    }

    /// Running sessions.
    #[must_use]
    pub fn sessions(&self) -> &[EffectSession] {
        &self.sessions
    }

    /// Look up a running session.
    #[must_use]
    pub fn session(&self, handle: EffectHandle) -> Option<&EffectSession> {
        self.sessions.iter().find(|s| s.handle == handle)
    }

    /// Whether a session is still running.
    #[must_use]
    pub fn is_active(&self, handle: EffectHandle) -> bool {
        self.session(handle).is_some()
    }

    /// Number of running sessions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Whether any running session keeps player controls disabled.
    #[must_use]
    pub fn holds_controls(&self) -> bool {
        self.sessions.iter().any(|s| s.holds_controls)
    }

    /// Drop a session without running its cleanup. Returns whether it existed.
    pub fn cancel(&mut self, handle: EffectHandle) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.handle != handle);
        let removed = self.sessions.len() != before;
        if removed {
            debug!("Cancelled effect {:?}", handle);
        }
        removed
    }

    /// Drop every session. Returns how many were running.
    pub fn dispose_all(&mut self) -> usize {
        let count = self.sessions.len();
        self.sessions.clear();
        if count > 0 {
            debug!("Disposed {count} effect sessions");
        }
        count
    }

    /// Run every tick due at `now` and complete finished sessions.
    ///
    /// Returns the handles of sessions that completed.
    pub fn advance(&mut self, now: Millis, targets: &mut EffectTargets<'_>) -> Vec<EffectHandle> {
        let mut completed = Vec::new();
        for session in &mut self.sessions {
            run_due_ticks(session, now, targets);
            if now >= session.end_time() {
                finish(session, now, targets);
                completed.push(session.handle);
            }
        }
        if completed.is_empty() {
            return completed;
        }

        self.sessions.retain(|s| !completed.contains(&s.handle));
        if !self.holds_controls() {
            targets.player.controls_disabled = false;
        }
        for handle in &completed {
            debug!("Effect {:?} completed", handle);
        }
        completed
    }
}

fn run_due_ticks(session: &mut EffectSession, now: Millis, targets: &mut EffectTargets<'_>) {
    match session.cadence {
        TickCadence::EveryFrame => {
            if now < session.end_time() {
                tick(session, now, targets);
                session.tick_count += 1;
            }
        },
        TickCadence::Interval(interval) => {
            let end = session.end_time();
            while session.next_tick_at <= now && session.next_tick_at <= end {
                let at = session.next_tick_at;
                tick(session, at, targets);
                session.tick_count += 1;
                session.next_tick_at += interval.max(1);
            }
        },
    }
}

fn tick(session: &EffectSession, at: Millis, targets: &mut EffectTargets<'_>) {
    match session.kind {
        EffectKind::Dash(motion) => {
            targets.player.position = motion.position_at(session.progress(at));
        },
        EffectKind::SwordSpin(pulse) => {
            strike_radius(pulse.radius, pulse.tick_damage, at, targets);
        },
        EffectKind::ThreeWayCut(cut) => {
            let stats = targets.player.stats;
            let chance = three_way_cut_crit_chance(cut.level, stats.int);
            let crit = targets.crit.roll(chance);
            let damage = three_way_cut_damage(cut.level, stats.vit, stats.int, crit) as f32;
            let origin = targets.player.position;
            for enemy in targets
                .enemies
                .iter_mut()
                .filter(|e| e.is_targetable() && cut.covers(origin, e.position))
            {
                let dealt = enemy.take_damage(damage, at);
                if dealt > 0.0 {
                    targets.sink.report(enemy.id, dealt);
                }
            }
        },
    }
}

fn finish(session: &EffectSession, now: Millis, targets: &mut EffectTargets<'_>) {
    match session.kind {
        EffectKind::Dash(motion) => {
            targets.player.position = motion.to;
        },
        EffectKind::SwordSpin(pulse) => {
            strike_radius(pulse.radius, pulse.finisher_damage, now, targets);
        },
        EffectKind::ThreeWayCut(_) => {},
    }
}

fn strike_radius(radius: f32, damage: f32, at: Millis, targets: &mut EffectTargets<'_>) {
    let origin = targets.player.position;
    for enemy in targets
        .enemies
        .iter_mut()
        .filter(|e| e.is_targetable() && distance(origin, e.position) <= radius)
    {
        let dealt = enemy.take_damage(damage, at);
        if dealt > 0.0 {
            targets.sink.report(enemy.id, dealt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::NeverCrit;
    use std::f32::consts::FRAC_PI_4;
    use std::f32::consts::FRAC_PI_6;

    fn spin_plan(tick_damage: f32, finisher_damage: f32) -> EffectPlan {
        EffectPlan {
            skill: SkillId::SwordSpin,
            duration: 1_000,
            cadence: TickCadence::Interval(100),
            holds_controls: true,
            kind: EffectKind::SwordSpin(SpinPulse {
                radius: 100.0,
                tick_damage,
                finisher_damage,
                visual: SpinVisual {
                    radius: 100.0,
                    duration: 1_000,
                    rotation_speed: 720.0,
                },
            }),
        }
    }

    fn dash_plan() -> EffectPlan {
        EffectPlan {
            skill: SkillId::Dash,
            duration: 200,
            cadence: TickCadence::EveryFrame,
            holds_controls: true,
            kind: EffectKind::Dash(DashMotion {
                from: Vec2::ZERO,
                to: Vec2::new(100.0, 0.0),
                visual: DashVisual {
                    trail_length: 100.0,
                    duration: 200,
                },
            }),
        }
    }

    fn cut(facing: Vec2) -> CrossCut {
        CrossCut {
            facing,
            range: 150.0,
            half_angle: FRAC_PI_6,
            spread: FRAC_PI_4,
            level: 1,
        }
    }

    #[test]
    fn test_spin_ticks_then_finisher() {
        let mut scheduler = EffectScheduler::new();
        let mut player = Player::default();
        player.controls_disabled = true;
        let mut enemies = vec![Enemy::new(Vec2::new(50.0, 0.0), 1_000.0)];
        let mut reported = Vec::new();
        let mut sink = |d: f32| reported.push(d);
        let mut crit = NeverCrit;

        let handle = scheduler.start(spin_plan(2.0, 20.0), 0);
        let mut targets = EffectTargets {
            player: &mut player,
            enemies: &mut enemies,
            crit: &mut crit,
            sink: &mut sink,
        };

        assert!(scheduler.advance(50, &mut targets).is_empty());
        scheduler.advance(450, &mut targets);
        assert_eq!(scheduler.session(handle).map(|s| s.tick_count), Some(4));

        let completed = scheduler.advance(1_000, &mut targets);
        assert_eq!(completed, vec![handle]);
        assert!(!targets.player.controls_disabled);
        assert_eq!(scheduler.active_count(), 0);

        drop(targets);
        // Ten pulses of 2 plus the finisher.
        assert_eq!(reported.len(), 11);
        assert_eq!(enemies[0].health.current(), Some(1_000.0 - 40.0));
    }

    #[test]
    fn test_dash_moves_each_frame() {
        let mut scheduler = EffectScheduler::new();
        let mut player = Player::default();
        let mut enemies: Vec<Enemy> = Vec::new();
        let mut sink = |_: f32| {};
        let mut crit = NeverCrit;
        scheduler.start(dash_plan(), 1_000);
        let mut targets = EffectTargets {
            player: &mut player,
            enemies: &mut enemies,
            crit: &mut crit,
            sink: &mut sink,
        };

        scheduler.advance(1_100, &mut targets);
        assert!((targets.player.position.x - 50.0).abs() < 1e-4);

        scheduler.advance(1_250, &mut targets);
        assert_eq!(targets.player.position, Vec2::new(100.0, 0.0));
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_cancel_leaves_world_untouched() {
        let mut scheduler = EffectScheduler::new();
        let mut player = Player::default();
        player.controls_disabled = true;
        let mut enemies = vec![Enemy::new(Vec2::new(50.0, 0.0), 100.0)];
        let mut sink = |_: f32| {};
        let mut crit = NeverCrit;

        let handle = scheduler.start(spin_plan(2.0, 20.0), 0);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));

        let mut targets = EffectTargets {
            player: &mut player,
            enemies: &mut enemies,
            crit: &mut crit,
            sink: &mut sink,
        };
        assert!(scheduler.advance(5_000, &mut targets).is_empty());
        assert!(targets.player.controls_disabled);
        assert_eq!(enemies[0].health.current(), Some(100.0));
    }

    #[test]
    fn test_controls_stay_disabled_while_another_session_holds() {
        let mut scheduler = EffectScheduler::new();
        let mut player = Player::default();
        player.controls_disabled = true;
        let mut enemies: Vec<Enemy> = Vec::new();
        let mut sink = |_: f32| {};
        let mut crit = NeverCrit;

        scheduler.start(dash_plan(), 0);
        scheduler.start(spin_plan(1.0, 1.0), 0);
        let mut targets = EffectTargets {
            player: &mut player,
            enemies: &mut enemies,
            crit: &mut crit,
            sink: &mut sink,
        };

        scheduler.advance(300, &mut targets);
        assert_eq!(scheduler.active_count(), 1);
        assert!(targets.player.controls_disabled);

        scheduler.advance(1_000, &mut targets);
        assert!(!targets.player.controls_disabled);
    }

    #[test]
    fn test_dispose_all() {
        let mut scheduler = EffectScheduler::new();
        let a = scheduler.start(dash_plan(), 0);
        let b = scheduler.start(dash_plan(), 0);
        assert_ne!(a, b);
        assert_eq!(scheduler.dispose_all(), 2);
        assert!(!scheduler.is_active(a));
        // Handles keep counting after disposal.
        let c = scheduler.start(dash_plan(), 10);
        assert!(c.raw() > b.raw());
    }

    #[test]
    fn test_cross_cut_cones() {
        let cut = cut(Vec2::X);
        let origin = Vec2::ZERO;
        assert!(cut.covers(origin, Vec2::new(100.0, 0.0)));
        // 45 degrees off, centre of a side cone.
        assert!(cut.covers(origin, Vec2::new(70.0, 70.0)));
        assert!(cut.covers(origin, Vec2::new(70.0, -70.0)));
        // Straight up is 90 degrees off, outside every cone.
        assert!(!cut.covers(origin, Vec2::new(0.0, 100.0)));
        assert!(!cut.covers(origin, Vec2::new(-100.0, 0.0)));
        assert!(!cut.covers(origin, Vec2::new(200.0, 0.0)));
    }

    #[test]
    fn test_cut_ticks_five_times() {
        let mut scheduler = EffectScheduler::new();
        let mut player = Player::default();
        let mut enemies = vec![Enemy::new(Vec2::new(100.0, 0.0), 1_000.0)];
        let mut hits = 0;
        let mut sink = |_: f32| hits += 1;
        let mut crit = NeverCrit;

        scheduler.start(
            EffectPlan {
                skill: SkillId::ThreeWayCut,
                duration: 1_500,
                cadence: TickCadence::Interval(300),
                holds_controls: true,
                kind: EffectKind::ThreeWayCut(cut(Vec2::X)),
            },
            0,
        );
        let mut targets = EffectTargets {
            player: &mut player,
            enemies: &mut enemies,
            crit: &mut crit,
            sink: &mut sink,
        };
        scheduler.advance(2_000, &mut targets);
        drop(targets);

        assert_eq!(hits, 5);
        // Level 1, no stats: 6 per tick.
        assert_eq!(enemies[0].health.current(), Some(970.0));
    }
}
