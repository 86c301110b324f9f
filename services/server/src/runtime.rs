//! Engine task
//!
//! Consumes the command queue one command at a time. Each command is
//! handled to completion against the session manager, the reply is sent,
//! and only then are records appended and events dispatched to observers.
//! Observer channels that turn out closed are treated as disconnects and
//! swept through the same queue as every other mutation.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use market_data::EventFanout;
use persistence::records::SessionEventKind;
use persistence::{Record, RecordSink};
use session::SessionManager;
use types::events::OutboundEvent;
use types::ids::ParticipantId;

use crate::commands::{Command, SubmitReply};
use crate::handle::EngineHandle;

/// The single writer over all game state
pub struct EngineRuntime {
    manager: SessionManager,
    fanout: EventFanout,
    sink: Box<dyn RecordSink>,
    queue: UnboundedSender<Command>,
    inbox: UnboundedReceiver<Command>,
}

impl EngineRuntime {
    /// Build a runtime and the handle clients use to reach it
    pub fn new(manager: SessionManager, sink: Box<dyn RecordSink>) -> (Self, EngineHandle) {
        let (tx, rx) = unbounded_channel();
        let runtime = Self {
            manager,
            fanout: EventFanout::new(),
            sink,
            queue: tx.clone(),
            inbox: rx,
        };
        (runtime, EngineHandle::new(tx))
    }

    /// Spawn a task that feeds one `Tick` per second into the queue
    ///
    /// Ticks are ordinary commands, so the end-of-game transition runs on
    /// the engine task like everything else. The task stops when the
    /// engine goes away.
    pub fn spawn_timer(handle: &EngineHandle) -> JoinHandle<()> {
        let tx = handle.sender();
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(Command::Tick).is_err() {
                    break;
                }
            }
        })
    }

    /// Process commands until every handle is dropped
    pub async fn run(mut self) {
        tracing::info!("engine task started");
        while let Some(command) = self.inbox.recv().await {
            self.handle(command);
        }
        tracing::info!("engine task stopped");
    }

    fn handle(&mut self, command: Command) {
        tracing::debug!(command = command.label(), "handling command");
        let mut records: Vec<Record> = Vec::new();
        let mut events: Vec<OutboundEvent> = Vec::new();

        match command {
            Command::CreateSession { reply } => {
                let result = self.manager.create_session().map(|(session_id, evs)| {
                    events = evs;
                    if let Some(session) = self.manager.session() {
                        records.push(Record::session(session));
                    }
                    session_id
                });
                let _ = reply.send(result);
            }
            Command::Join { name, reply } => {
                let result = self.manager.join(&name).map(|(participant, evs)| {
                    events = evs;
                    if let Some(session) = self.manager.session() {
                        records.push(Record::participant(session, &participant));
                        records.push(Record::event(
                            session,
                            SessionEventKind::Admission,
                            Some(&participant),
                        ));
                    }
                    participant
                });
                let _ = reply.send(result);
            }
            Command::Leave {
                participant_id,
                reply,
            } => {
                let departing = self.manager.ledger().get(&participant_id).cloned();
                let result = self.manager.leave(&participant_id).map(|(cancelled, evs)| {
                    events = evs;
                    if let Some(session) = self.manager.session() {
                        for order in &cancelled {
                            records.push(Record::order(order));
                        }
                        records.push(Record::event(
                            session,
                            SessionEventKind::Departure,
                            departing.as_ref(),
                        ));
                    }
                });
                let _ = reply.send(result);
            }
            Command::Start {
                participant_id,
                reply,
            } => {
                let result = self.manager.start(&participant_id).map(|evs| {
                    events = evs;
                    if let Some(session) = self.manager.session() {
                        records.push(Record::event(session, SessionEventKind::Start, None));
                        records.push(Record::session(session));
                    }
                });
                let _ = reply.send(result);
            }
            Command::SubmitOrder {
                participant_id,
                product,
                side,
                kind,
                quantity,
                price,
                reply,
            } => {
                let result = self
                    .manager
                    .submit_order(&participant_id, product, side, kind, quantity, price)
                    .map(|(outcome, evs)| {
                        events = evs;
                        records.push(Record::order(&outcome.order));
                        for trade in &outcome.trades {
                            records.push(Record::trade(trade));
                        }
                        SubmitReply {
                            order: outcome.order,
                            trades: outcome.trades,
                        }
                    });
                let _ = reply.send(result);
            }
            Command::CancelOrder {
                participant_id,
                order_id,
                reply,
            } => {
                let result = self
                    .manager
                    .cancel_order(&participant_id, &order_id)
                    .map(|(cancelled, evs)| {
                        events = evs;
                        records.push(Record::order(&cancelled));
                    });
                let _ = reply.send(result);
            }
            Command::Reset { reply } => {
                // Final holdings must be captured before the ledger clears
                let pids = self
                    .manager
                    .session()
                    .map(|s| s.participants.clone())
                    .unwrap_or_default();
                let participants: Vec<_> = pids
                    .iter()
                    .filter_map(|pid| self.manager.ledger().get(pid).cloned())
                    .collect();
                let (outcome, evs) = self.manager.reset();
                events = evs;
                if let Some(session) = &outcome.ended_snapshot {
                    for order in &outcome.cancelled_orders {
                        records.push(Record::order(order));
                    }
                    records.push(Record::event(session, SessionEventKind::End, None));
                    records.push(Record::session(session));
                    for participant in &participants {
                        records.push(Record::participant(session, participant));
                    }
                }
                let _ = reply.send(Ok(()));
            }
            Command::Subscribe {
                participant_id,
                sender,
                reply,
            } => {
                let snapshot = self.manager.subscription_snapshot(participant_id.as_ref());
                let observer_id = self.fanout.subscribe(participant_id, sender, snapshot);
                let _ = reply.send(observer_id);
            }
            Command::Unsubscribe { observer_id } => {
                if let Some(participant_id) = self.fanout.unsubscribe(observer_id) {
                    self.enqueue_disconnect(participant_id);
                }
            }
            Command::Disconnect { participant_id } => {
                match self.manager.leave(&participant_id) {
                    Ok((cancelled, evs)) => {
                        events = evs;
                        for order in &cancelled {
                            records.push(Record::order(order));
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%err, %participant_id, "disconnect handling failed");
                    }
                }
            }
            Command::Tick => {
                let (outcome, evs) = self.manager.tick();
                events = evs;
                if outcome.ended {
                    for order in &outcome.cancelled_orders {
                        records.push(Record::order(order));
                    }
                    if let Some(session) = self.manager.session() {
                        records.push(Record::event(session, SessionEventKind::End, None));
                        records.push(Record::session(session));
                        for pid in session.participants.iter() {
                            if let Some(participant) = self.manager.ledger().get(pid) {
                                records.push(Record::participant(session, participant));
                            }
                        }
                    }
                }
            }
        }

        // Outside the mutation: records first, then observer pushes
        for record in &records {
            if let Err(err) = self.sink.append(record) {
                tracing::error!(%err, record = record.label(), "record append failed");
            }
        }
        let dead = self.fanout.dispatch(&events);
        for (observer_id, participant_id) in dead {
            tracing::info!(observer_id, "observer disconnected");
            if let Some(participant_id) = participant_id {
                self.enqueue_disconnect(participant_id);
            }
        }
    }

    /// Disconnect handling is itself a command on the queue, never an
    /// out-of-band mutation
    fn enqueue_disconnect(&self, participant_id: ParticipantId) {
        let _ = self.queue.send(Command::Disconnect { participant_id });
    }
}
