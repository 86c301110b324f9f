//! Observer registry and dispatch
//!
//! Keyed by a small integer id; iteration is over a `BTreeMap` so delivery
//! order is deterministic. An observer may be bound to a participant, which
//! routes targeted events (player state, final score) to it.

use std::collections::BTreeMap;

use tokio::sync::mpsc::UnboundedSender;

use types::events::{EventScope, GameEvent, OutboundEvent};
use types::ids::ParticipantId;

/// Unique observer identifier
pub type ObserverId = u64;

struct Observer {
    /// Participant binding for targeted events; None for spectators
    participant_id: Option<ParticipantId>,
    sender: UnboundedSender<GameEvent>,
}

/// All connected observers of the current session
pub struct EventFanout {
    observers: BTreeMap<ObserverId, Observer>,
    next_id: ObserverId,
}

impl EventFanout {
    pub fn new() -> Self {
        Self {
            observers: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Register an observer and deliver its initial snapshot events
    pub fn subscribe(
        &mut self,
        participant_id: Option<ParticipantId>,
        sender: UnboundedSender<GameEvent>,
        initial_events: Vec<GameEvent>,
    ) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;

        for event in initial_events {
            if sender.send(event).is_err() {
                tracing::warn!(observer_id = id, "observer gone before snapshot completed");
                return id;
            }
        }
        self.observers.insert(
            id,
            Observer {
                participant_id,
                sender,
            },
        );
        tracing::debug!(observer_id = id, "observer subscribed");
        id
    }

    /// Remove an observer; returns its participant binding, if any
    pub fn unsubscribe(&mut self, observer_id: ObserverId) -> Option<ParticipantId> {
        self.observers
            .remove(&observer_id)
            .and_then(|o| o.participant_id)
    }

    /// Deliver a batch of events produced by one command
    ///
    /// Broadcast events go to every observer; targeted events only to
    /// observers bound to that participant. Observers whose channel has
    /// closed are dropped and returned so the caller can run their
    /// disconnect handling.
    pub fn dispatch(&mut self, events: &[OutboundEvent]) -> Vec<(ObserverId, Option<ParticipantId>)> {
        let mut dead = Vec::new();

        for outbound in events {
            for (id, observer) in &self.observers {
                let wanted = match outbound.scope {
                    EventScope::Broadcast => true,
                    EventScope::Participant(pid) => observer.participant_id == Some(pid),
                };
                if !wanted {
                    continue;
                }
                if observer.sender.send(outbound.event.clone()).is_err()
                    && !dead.iter().any(|(d, _)| d == id)
                {
                    dead.push((*id, observer.participant_id));
                }
            }
        }

        for (id, _) in &dead {
            self.observers.remove(id);
            tracing::info!(observer_id = id, "observer dropped (channel closed)");
        }
        dead
    }

    /// Send one event to a single observer
    pub fn send_to(&mut self, observer_id: ObserverId, event: GameEvent) -> bool {
        match self.observers.get(&observer_id) {
            Some(observer) => observer.sender.send(event).is_ok(),
            None => false,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Observers bound to a participant
    pub fn observers_of(&self, participant_id: &ParticipantId) -> Vec<ObserverId> {
        self.observers
            .iter()
            .filter(|(_, o)| o.participant_id == Some(*participant_id))
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
    use types::events::TimerView;

    fn timer(seconds: u64) -> GameEvent {
        GameEvent::Timer(TimerView {
            remaining_seconds: seconds,
        })
    }

    fn drain(rx: &mut UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_subscribe_delivers_snapshot() {
        let mut fanout = EventFanout::new();
        let (tx, mut rx) = unbounded_channel();

        fanout.subscribe(None, tx, vec![timer(10), timer(9)]);

        let got = drain(&mut rx);
        assert_eq!(got.len(), 2);
        assert_eq!(fanout.observer_count(), 1);
    }

    #[test]
    fn test_broadcast_reaches_everyone() {
        let mut fanout = EventFanout::new();
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();
        fanout.subscribe(None, tx1, Vec::new());
        fanout.subscribe(None, tx2, Vec::new());

        fanout.dispatch(&[OutboundEvent::broadcast(timer(5))]);

        assert_eq!(drain(&mut rx1).len(), 1);
        assert_eq!(drain(&mut rx2).len(), 1);
    }

    #[test]
    fn test_targeted_reaches_only_bound_observer() {
        let mut fanout = EventFanout::new();
        let alice = ParticipantId::new();
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();
        fanout.subscribe(Some(alice), tx1, Vec::new());
        fanout.subscribe(None, tx2, Vec::new());

        fanout.dispatch(&[OutboundEvent::targeted(alice, timer(5))]);

        assert_eq!(drain(&mut rx1).len(), 1);
        assert!(drain(&mut rx2).is_empty());
    }

    #[test]
    fn test_dead_observer_is_reaped() {
        let mut fanout = EventFanout::new();
        let alice = ParticipantId::new();
        let (tx, rx) = unbounded_channel();
        fanout.subscribe(Some(alice), tx, Vec::new());
        drop(rx);

        let dead = fanout.dispatch(&[OutboundEvent::broadcast(timer(5))]);

        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].1, Some(alice));
        assert_eq!(fanout.observer_count(), 0);
    }

    #[test]
    fn test_unsubscribe_returns_binding() {
        let mut fanout = EventFanout::new();
        let alice = ParticipantId::new();
        let (tx, _rx) = unbounded_channel();
        let id = fanout.subscribe(Some(alice), tx, Vec::new());

        assert_eq!(fanout.unsubscribe(id), Some(alice));
        assert_eq!(fanout.observer_count(), 0);
        assert_eq!(fanout.unsubscribe(id), None, "second removal is a no-op");
    }

    #[test]
    fn test_observers_of() {
        let mut fanout = EventFanout::new();
        let alice = ParticipantId::new();
        let (tx1, _rx1) = unbounded_channel();
        let (tx2, _rx2) = unbounded_channel();
        let id1 = fanout.subscribe(Some(alice), tx1, Vec::new());
        fanout.subscribe(None, tx2, Vec::new());

        assert_eq!(fanout.observers_of(&alice), vec![id1]);
    }
}
