//! Event bus for damage reports, audio cues, and UI notifications.

use crossbeam_channel::{bounded, Receiver, Sender};
use emberfall_common::EnemyId;
use serde::{Deserialize, Serialize};

use crate::skills::SkillId;

/// Fire-and-forget audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Footstep while walking
    Walk,
    /// Basic attack swing
    Swing,
}

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// One discrete damage application
    DamageDealt {
        /// Enemy that took the damage
        target: EnemyId,
        /// Health removed
        amount: f32,
    },
    /// Audio cue
    Sound(SoundCue),
    /// A skill passed its gates and executed
    SkillActivated {
        /// Skill that fired
        skill: SkillId,
    },
    /// Target selection changed
    EnemySelected {
        /// New target, `None` when cleared
        target: Option<EnemyId>,
    },
    /// An enemy's health reached zero
    EnemyDefeated {
        /// Enemy that died
        target: EnemyId,
    },
}

/// Receives every discrete damage application.
pub trait DamageSink {
    /// Report `amount` health removed from `target`.
    fn report(&mut self, target: EnemyId, amount: f32);
}

impl<F: FnMut(f32)> DamageSink for F {
    fn report(&mut self, _target: EnemyId, amount: f32) {
        self(amount);
    }
}

/// Publishing handle onto an [`EventBus`].
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: Sender<GameEvent>,
}

impl EventSender {
    /// Publishes an event. If the bus is full the event is dropped.
    pub fn publish(&self, event: GameEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Publishes an audio cue.
    pub fn sound(&self, cue: SoundCue) {
        self.publish(GameEvent::Sound(cue));
    }
}

impl DamageSink for EventSender {
    fn report(&mut self, target: EnemyId, amount: f32) {
        self.publish(GameEvent::DamageDealt { target, amount });
    }
}

/// Event bus for broadcasting events to the host.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(GameEvent::Sound(SoundCue::Swing));
        bus.sender().sound(SoundCue::Walk);
        assert_eq!(bus.pending_count(), 2);

        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                GameEvent::Sound(SoundCue::Swing),
                GameEvent::Sound(SoundCue::Walk)
            ]
        );
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops() {
        let bus = EventBus::new(1);
        bus.publish(GameEvent::Sound(SoundCue::Swing));
        bus.publish(GameEvent::Sound(SoundCue::Walk));
        assert_eq!(bus.drain().len(), 1);
    }

    #[test]
    fn test_sender_as_damage_sink() {
        let bus = EventBus::default();
        let mut sink = bus.sender();
        let target = EnemyId::from_raw(9);
        sink.report(target, 12.0);
        assert_eq!(
            bus.drain(),
            vec![GameEvent::DamageDealt {
                target,
                amount: 12.0
            }]
        );
    }

    #[test]
    fn test_closure_as_damage_sink() {
        let mut total = 0.0;
        {
            let mut sink = |amount: f32| total += amount;
            sink.report(EnemyId::from_raw(1), 3.0);
            sink.report(EnemyId::from_raw(2), 4.5);
        }
        assert_eq!(total, 7.5);
    }
}
