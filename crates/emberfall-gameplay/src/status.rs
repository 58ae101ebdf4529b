//! Timed status effects on enemies.
//!
//! Effects are never removed by a timer. A stun stays in the enemy's
//! `status_effects` after it runs out and simply reads as inactive.

use emberfall_common::{elapsed, Millis};

use crate::enemy::{Enemy, Stun};

/// Stun `enemy` for `duration` starting at `now`.
///
/// Any existing stun is replaced: the last application wins and restarts the timer.
#[must_use]
pub fn apply_stun(enemy: &Enemy, duration: Millis, now: Millis) -> Enemy {
    let mut next = enemy.clone();
    next.status_effects.stun = Some(Stun {
        start_time: now,
        duration,
    });
    next
}

/// Whether the enemy is stunned at `now`.
#[must_use]
pub fn is_stunned(enemy: &Enemy, now: Millis) -> bool {
    enemy
        .status_effects
        .stun
        .is_some_and(|stun| elapsed(now, stun.start_time) < stun.duration)
}

/// Stun time left at `now`, zero when not stunned.
#[must_use]
pub fn stun_time_remaining(enemy: &Enemy, now: Millis) -> Millis {
    enemy.status_effects.stun.map_or(0, |stun| {
        stun.duration
            .saturating_sub(elapsed(now, stun.start_time))
    })
}
