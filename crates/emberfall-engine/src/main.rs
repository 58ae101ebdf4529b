//! # Emberfall Engine
//!
//! Headless driver for the Emberfall simulation core.
//!
//! Loads tuning from `emberfall.toml`, runs a scripted session on a manual
//! clock, and prints the final world state as JSON.
//!
//! Usage: `emberfall [script.json]`. Without a script the built-in demo runs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod script;

use std::path::Path;

use anyhow::{Context, Result};
use emberfall_common::{Clock, ManualClock, SystemClock, Vec2};
use emberfall_gameplay::{GameConfig, GameSession, Player, SkillManager};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::script::{RunStats, Script};

const CONFIG_PATH: &str = "emberfall.toml";

#[derive(Serialize)]
struct Report<'a> {
    stats: &'a RunStats,
    world: &'a emberfall_gameplay::World,
}

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("emberfall=info".parse()?))
        .init();

    info!("Emberfall starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = GameConfig::load_from(CONFIG_PATH);
    let script = match std::env::args().nth(1) {
        Some(path) => Script::load(Path::new(&path)).with_context(|| format!("loading {path}"))?,
        None => Script::demo(),
    };

    let player = Player::new(Vec2::new(
        config.bounds.width / 4.0,
        config.bounds.height / 3.0,
    ));
    let crit = fastrand::Rng::with_seed(script.seed);
    let mut session = GameSession::new(config, player)
        .with_skill_manager(SkillManager::new().with_crit_roll(Box::new(crit)));
    script.populate(&mut session);

    let clock = ManualClock::new(SystemClock.now_ms());
    let stats = script::run(&script, &mut session, &clock);
    info!(
        "Ran {} frames, {} skills, {} damage",
        stats.frames,
        stats.skills_used.len(),
        stats.damage_dealt
    );

    let report = Report {
        stats: &stats,
        world: session.world(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Emberfall shutdown complete");
    Ok(())
}
