//! Scripted input timelines for headless runs.
//!
//! A script stands in for the browser host: it presses and releases keys,
//! clicks, and cycles targets at fixed times while the driver steps frames.

use std::fs;
use std::path::Path;

use emberfall_common::{Clock, EmberfallError, EmberfallResult, ManualClock, Millis, Vec2};
use emberfall_gameplay::{
    Enemy, GameEvent, GameSession, Key, KeyState, MapContext, MapId, SkillId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Spacing between frames requested by the driver.
pub const FRAME_MS: Millis = 16;

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Action {
    /// Hold a key
    Press {
        /// Key to hold
        key: Key,
    },
    /// Let go of a key
    Release {
        /// Key to release
        key: Key,
    },
    /// Click at a world position
    Click {
        /// World position
        at: Vec2,
    },
    /// Target the next enemy in range
    CycleTarget,
    /// Toggle auto-attack on the current target
    ToggleAutoAttack,
    /// Spend points on a skill
    Upgrade {
        /// Skill to raise
        skill: SkillId,
    },
}

/// An action fired once the clock reaches `at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Time offset from the start of the run
    pub at: Millis,
    /// What happens
    pub action: Action,
}

/// Enemy placed before the run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    /// World position
    pub position: Vec2,
    /// Max health, `None` for an invulnerable dummy
    pub health: Option<f32>,
}

/// A complete headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Crit roll seed
    pub seed: u64,
    /// Map the run takes place on
    pub map: MapId,
    /// Run length
    pub duration_ms: Millis,
    /// Enemies spawned at the start
    pub enemies: Vec<Spawn>,
    /// Timeline, sorted by `at`
    pub steps: Vec<Step>,
}

impl Default for Script {
    fn default() -> Self {
        Self::demo()
    }
}

impl Script {
    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut script: Self = serde_json::from_str(json)?;
        script.steps.sort_by_key(|s| s.at);
        Ok(script)
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> EmberfallResult<Self> {
        let json = fs::read_to_string(path)?;
        let script =
            Self::from_json(&json).map_err(|e| EmberfallError::Serialization(e.to_string()))?;
        info!("Loaded script {} ({} steps)", path.display(), script.steps.len());
        Ok(script)
    }

    /// Built-in demo: walk, select, dash, spin, and fight.
    #[must_use]
    pub fn demo() -> Self {
        let step = |at, action| Step { at, action };
        Self {
            seed: 7,
            map: MapId::Wilderness,
            duration_ms: 4_000,
            enemies: vec![
                Spawn {
                    position: Vec2::new(760.0, 600.0),
                    health: Some(120.0),
                },
                Spawn {
                    position: Vec2::new(700.0, 700.0),
                    health: Some(60.0),
                },
                Spawn {
                    position: Vec2::new(900.0, 400.0),
                    health: None,
                },
            ],
            steps: vec![
                step(0, Action::Press { key: Key::D }),
                step(300, Action::Release { key: Key::D }),
                step(320, Action::Click {
                    at: Vec2::new(760.0, 600.0),
                }),
                step(400, Action::Press { key: Key::Digit1 }),
                step(450, Action::Release { key: Key::Digit1 }),
                step(900, Action::Press { key: Key::Digit2 }),
                step(950, Action::Release { key: Key::Digit2 }),
                step(2_000, Action::ToggleAutoAttack),
                step(3_200, Action::CycleTarget),
                step(3_300, Action::Press { key: Key::Digit6 }),
                step(3_350, Action::Release { key: Key::Digit6 }),
            ],
        }
    }

    /// Place the scripted enemies.
    pub fn populate(&self, session: &mut GameSession) {
        for spawn in &self.enemies {
            let enemy = match spawn.health {
                Some(health) => Enemy::new(spawn.position, health),
                None => Enemy::invulnerable(spawn.position),
            };
            session.spawn_enemy(enemy);
        }
    }
}

/// Totals from a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    /// Frames stepped
    pub frames: u64,
    /// Skills fired from hotkeys
    pub skills_used: Vec<SkillId>,
    /// Damage reported across all hits
    pub damage_dealt: f32,
    /// Enemies killed
    pub enemies_defeated: usize,
    /// Effect sessions disposed at shutdown
    pub disposed_effects: usize,
}

/// Step `session` through `script`, advancing `clock` one frame at a time.
pub fn run(script: &Script, session: &mut GameSession, clock: &ManualClock) -> RunStats {
    let start = clock.now_ms();
    let end = start + script.duration_ms;
    let map = MapContext::open(script.map);
    let mut keys = KeyState::new();
    let mut pending = script.steps.iter().peekable();
    let mut stats = RunStats::default();

    while clock.now_ms() < end {
        let now = clock.now_ms();
        while let Some(step) = pending.next_if(|s| start + s.at <= now) {
            apply(&step.action, session, &mut keys);
        }

        let summary = session.frame(now, &keys, map);
        if let Some(skill) = summary.skill_used {
            stats.skills_used.push(skill);
        }
        for event in session.drain_events() {
            match event {
                GameEvent::DamageDealt { amount, .. } => stats.damage_dealt += amount,
                GameEvent::EnemyDefeated { target } => {
                    info!("Enemy {target} defeated");
                    stats.enemies_defeated += 1;
                },
                _ => {},
            }
        }
        stats.frames += 1;
        clock.advance(FRAME_MS);
    }

    stats.disposed_effects = session.shutdown();
    stats
}

fn apply(action: &Action, session: &mut GameSession, keys: &mut KeyState) {
    debug!("Script action {action:?}");
    match action {
        Action::Press { key } => keys.set(*key, true),
        Action::Release { key } => keys.set(*key, false),
        Action::Click { at } => {
            session.select_at(*at);
        },
        Action::CycleTarget => {
            session.cycle_target();
        },
        Action::ToggleAutoAttack => {
            session.toggle_auto_attack();
        },
        Action::Upgrade { skill } => {
            if let Err(e) = session.upgrade_skill(*skill) {
                debug!("Upgrade skipped: {e}");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberfall_gameplay::{GameConfig, NeverCrit, Player, SkillManager};

    fn session() -> GameSession {
        GameSession::new(GameConfig::default(), Player::new(Vec2::new(600.0, 600.0)))
            .with_skill_manager(SkillManager::new().with_crit_roll(Box::new(NeverCrit)))
    }

    #[test]
    fn test_demo_runs() {
        let script = Script::demo();
        let mut game = session();
        script.populate(&mut game);
        let clock = ManualClock::new(10_000);

        let stats = run(&script, &mut game, &clock);
        assert_eq!(stats.frames, 250);
        assert_eq!(clock.now_ms(), 14_000);
        assert!(stats.skills_used.contains(&SkillId::Dash));
        assert!(stats.damage_dealt > 0.0);
        assert_eq!(game.effects().active_count(), 0);
    }

    #[test]
    fn test_parse_script() {
        let json = r#"{
            "map": "dungeon",
            "duration_ms": 100,
            "steps": [
                { "at": 50, "action": { "kind": "release", "key": "S" } },
                { "at": 0, "action": { "kind": "press", "key": "S" } },
                { "at": 60, "action": { "kind": "upgrade", "skill": "sword-spin" } }
            ]
        }"#;
        let script = Script::from_json(json).expect("parse");
        assert_eq!(script.map, MapId::Dungeon);
        assert_eq!(script.steps[0].action, Action::Press { key: Key::S });
        assert_eq!(
            script.steps[2].action,
            Action::Upgrade {
                skill: SkillId::SwordSpin
            }
        );
        // Missing fields come from the demo.
        assert_eq!(script.seed, 7);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = Script::load(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(EmberfallError::Io(_))));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            Script::load(&path),
            Err(EmberfallError::Serialization(_))
        ));

        let path = dir.path().join("ok.json");
        fs::write(&path, r#"{ "seed": 3 }"#).expect("write");
        assert_eq!(Script::load(&path).map(|s| s.seed).ok(), Some(3));
    }

    #[test]
    fn test_walk_script_moves_player() {
        let script = Script::from_json(
            r#"{ "enemies": [], "duration_ms": 160,
                 "steps": [{ "at": 0, "action": { "kind": "press", "key": "S" } }] }"#,
        )
        .expect("parse");
        let mut game = session();
        let stats = run(&script, &mut game, &ManualClock::new(0));
        assert_eq!(stats.frames, 10);
        assert_eq!(game.world().player().position, Vec2::new(600.0, 640.0));
    }
}
