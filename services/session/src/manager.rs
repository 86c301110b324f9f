//! Session lifecycle and command gating
//!
//! The manager owns the current session, the ledger, and the matching
//! engine. Commands are gated against session status and membership before
//! the engine sees them, and every mutation returns the outbound events
//! that describe it. The caller (the single-writer runtime) dispatches
//! those events after the mutation completes.

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use matching_engine::{Ledger, MatchingEngine, SubmitOutcome};
use types::config::{ConfigError, GameConfig};
use types::errors::{AuthError, GameError, StateError, ValidationError};
use types::events::{
    GameEvent, OrderView, OutboundEvent, ParticipantSummary, PlayerStateView, SessionStateView,
    TimerView, TradeView, trade_view,
};
use types::ids::{OrderId, ParticipantId, SessionId};
use types::order::{Order, OrderKind, Side};
use types::participant::Participant;
use types::product::Product;
use types::session::{Session, SessionStatus};
use types::trade::Trade;

use crate::inventory::generate_starting_inventory;
use crate::scoring;

/// Live leaderboard cadence: every fifth timer tick
pub const LEADERBOARD_TICK_INTERVAL: u64 = 5;

/// What one timer tick did
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// True exactly once per session, on the tick that ended it
    pub ended: bool,
    pub remaining_seconds: u64,
    /// Resting orders cancelled by the endgame sweep
    pub cancelled_orders: Vec<Order>,
    /// Endgame accounting, admission order; empty unless `ended`
    pub final_scores: Vec<types::events::FinalScoreView>,
}

/// What a reset tore down
#[derive(Debug, Clone, Default)]
pub struct ResetOutcome {
    /// The session that was ended early, if one was running
    pub ended_session: Option<SessionId>,
    /// Snapshot of the ended session, for persisted records
    pub ended_snapshot: Option<Session>,
    pub cancelled_orders: Vec<Order>,
    pub final_scores: Vec<types::events::FinalScoreView>,
}

/// Single owner of session, ledger, and engine state
pub struct SessionManager {
    config: GameConfig,
    session: Option<Session>,
    ledger: Ledger,
    engine: MatchingEngine,
    rng: ChaCha8Rng,
}

impl SessionManager {
    /// Create a manager with a validated configuration and an RNG seed
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = MatchingEngine::new(&config);
        Ok(Self {
            config,
            session: None,
            ledger: Ledger::new(),
            engine,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn status(&self) -> Option<SessionStatus> {
        self.session.as_ref().map(|s| s.status)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Open a fresh lobby
    ///
    /// Allowed when no session exists or the previous one has ended; any
    /// ended session's state is torn down here.
    pub fn create_session(&mut self) -> Result<(SessionId, Vec<OutboundEvent>), GameError> {
        if let Some(session) = &self.session {
            if session.status != SessionStatus::Ended {
                return Err(StateError::SessionAlreadyActive.into());
            }
        }

        self.ledger.clear();
        self.engine.reset();
        let session = Session::new(self.config.clone());
        let session_id = session.session_id;
        tracing::info!(%session_id, "session created");
        self.session = Some(session);

        let events = vec![OutboundEvent::broadcast(self.session_state_event())];
        Ok((session_id, events))
    }

    /// Admit a participant to the lobby
    pub fn join(&mut self, name: &str) -> Result<(Participant, Vec<OutboundEvent>), GameError> {
        let session = self.session.as_ref().ok_or(StateError::NoSession)?;
        if session.status != SessionStatus::Lobby {
            return Err(StateError::SessionNotLobby.into());
        }
        if session.is_full() {
            return Err(StateError::SessionFull {
                max_players: self.config.max_players,
            }
            .into());
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.ledger.name_taken(name) {
            return Err(ValidationError::NameTaken(name.to_string()).into());
        }

        let inventory = generate_starting_inventory(&self.config, &mut self.rng);
        let participant = Participant::new(name, self.config.starting_cash, inventory);
        let participant_id = self.ledger.admit(participant.clone());

        let session = self
            .session
            .as_mut()
            .ok_or(StateError::NoSession)?;
        session.participants.push(participant_id);
        if session.host.is_none() {
            session.host = Some(participant_id);
        }
        tracing::info!(%participant_id, name, "participant joined");

        let mut events = vec![OutboundEvent::broadcast(self.session_state_event())];
        if let Some(view) = self.player_state_view(&participant_id) {
            events.push(OutboundEvent::targeted(
                participant_id,
                GameEvent::PlayerState(view),
            ));
        }
        Ok((participant, events))
    }

    /// Remove a participant
    ///
    /// In the lobby this removes them outright (their name becomes free and
    /// the host role moves to the earliest remaining joiner). While running
    /// it only sweeps their resting orders; holdings stay in play and are
    /// scored at the end.
    pub fn leave(
        &mut self,
        participant_id: &ParticipantId,
    ) -> Result<(Vec<Order>, Vec<OutboundEvent>), GameError> {
        let Some(session) = self.session.as_mut() else {
            return Ok((Vec::new(), Vec::new()));
        };

        match session.status {
            SessionStatus::Lobby => {
                session.participants.retain(|p| p != participant_id);
                if session.host == Some(*participant_id) {
                    session.host = session.participants.first().copied();
                }
                self.ledger.remove(participant_id);
                tracing::info!(%participant_id, "participant left lobby");
                let events = vec![OutboundEvent::broadcast(self.session_state_event())];
                Ok((Vec::new(), events))
            }
            SessionStatus::Running => {
                let cancelled = self.engine.sweep_participant(&mut self.ledger, participant_id);
                let mut events = Vec::new();
                if !cancelled.is_empty() {
                    events.push(OutboundEvent::broadcast(self.order_books_event()));
                }
                if let Some(view) = self.player_state_view(participant_id) {
                    events.push(OutboundEvent::targeted(
                        *participant_id,
                        GameEvent::PlayerState(view),
                    ));
                }
                Ok((cancelled, events))
            }
            SessionStatus::Ended => Ok((Vec::new(), Vec::new())),
        }
    }

    /// Start the game: host only, lobby only, two players minimum
    pub fn start(
        &mut self,
        requester: &ParticipantId,
    ) -> Result<Vec<OutboundEvent>, GameError> {
        let session = self.session.as_mut().ok_or(StateError::NoSession)?;
        if session.status != SessionStatus::Lobby {
            return Err(StateError::SessionNotLobby.into());
        }
        if session.host != Some(*requester) {
            return Err(AuthError::NotHost.into());
        }
        if session.participants.len() < 2 {
            return Err(StateError::TooFewPlayers.into());
        }

        session.status = SessionStatus::Running;
        session.started_at = Some(Utc::now());
        tracing::info!(session_id = %session.session_id, "session started");

        let events = vec![
            OutboundEvent::broadcast(self.session_state_event()),
            OutboundEvent::broadcast(self.order_books_event()),
            OutboundEvent::broadcast(GameEvent::Leaderboard(self.live_leaderboard())),
            OutboundEvent::broadcast(self.timer_event()),
        ];
        Ok(events)
    }

    /// Place an order for a participant of the running session
    #[allow(clippy::too_many_arguments)]
    pub fn submit_order(
        &mut self,
        participant_id: &ParticipantId,
        product: Product,
        side: Side,
        kind: OrderKind,
        quantity: u64,
        price: Option<u64>,
    ) -> Result<(SubmitOutcome, Vec<OutboundEvent>), GameError> {
        let session_id = self.require_running()?;
        self.require_member(participant_id)?;

        let outcome = self.engine.submit(
            &mut self.ledger,
            session_id,
            *participant_id,
            product,
            side,
            kind,
            quantity,
            price,
        )?;

        let mut events = vec![OutboundEvent::broadcast(self.order_books_event())];
        if !outcome.trades.is_empty() {
            events.push(OutboundEvent::broadcast(GameEvent::Trades {
                trades: self.trade_views(&outcome.trades),
            }));
        }
        for pid in Self::affected_participants(participant_id, &outcome.trades) {
            if let Some(view) = self.player_state_view(&pid) {
                events.push(OutboundEvent::targeted(pid, GameEvent::PlayerState(view)));
            }
        }
        Ok((outcome, events))
    }

    /// Cancel a resting order
    pub fn cancel_order(
        &mut self,
        participant_id: &ParticipantId,
        order_id: &OrderId,
    ) -> Result<(Order, Vec<OutboundEvent>), GameError> {
        self.require_running()?;

        let cancelled = self
            .engine
            .cancel(&mut self.ledger, order_id, participant_id)?;

        let mut events = vec![OutboundEvent::broadcast(self.order_books_event())];
        if let Some(view) = self.player_state_view(participant_id) {
            events.push(OutboundEvent::targeted(
                *participant_id,
                GameEvent::PlayerState(view),
            ));
        }
        Ok((cancelled, events))
    }

    /// Advance the game clock by one second
    ///
    /// Emits the timer every tick and the live leaderboard every fifth
    /// tick; the tick that exhausts the clock ends the session.
    pub fn tick(&mut self) -> (TickOutcome, Vec<OutboundEvent>) {
        let Some(session) = self.session.as_mut() else {
            return (TickOutcome::default(), Vec::new());
        };
        if session.status != SessionStatus::Running {
            return (TickOutcome::default(), Vec::new());
        }

        session.ticks_elapsed += 1;
        let ticks = session.ticks_elapsed;
        let remaining = session.remaining_seconds();

        let mut events = vec![OutboundEvent::broadcast(GameEvent::Timer(TimerView {
            remaining_seconds: remaining,
        }))];

        if remaining == 0 {
            let (cancelled, scores, mut end_events) = self.end_session();
            events.append(&mut end_events);
            let outcome = TickOutcome {
                ended: true,
                remaining_seconds: 0,
                cancelled_orders: cancelled,
                final_scores: scores,
            };
            return (outcome, events);
        }

        if ticks % LEADERBOARD_TICK_INTERVAL == 0 {
            events.push(OutboundEvent::broadcast(GameEvent::Leaderboard(
                self.live_leaderboard(),
            )));
        }

        (
            TickOutcome {
                ended: false,
                remaining_seconds: remaining,
                cancelled_orders: Vec::new(),
                final_scores: Vec::new(),
            },
            events,
        )
    }

    /// Tear down everything
    ///
    /// A running session is ended (with scoring and end events) first, then
    /// session, ledger, and books are cleared.
    pub fn reset(&mut self) -> (ResetOutcome, Vec<OutboundEvent>) {
        let mut outcome = ResetOutcome::default();
        let mut events = Vec::new();

        if let Some(session) = &self.session {
            if session.status == SessionStatus::Running {
                outcome.ended_session = Some(session.session_id);
                let (cancelled, scores, mut end_events) = self.end_session();
                outcome.cancelled_orders = cancelled;
                outcome.final_scores = scores;
                outcome.ended_snapshot = self.session.clone();
                events.append(&mut end_events);
            }
        }

        self.session = None;
        self.ledger.clear();
        self.engine.reset();
        tracing::info!("session state cleared");

        (outcome, events)
    }

    /// Events that bring a fresh observer up to date
    ///
    /// Config always comes first; state snapshots follow if a session
    /// exists, plus the observer's own player state when they are a
    /// participant.
    pub fn subscription_snapshot(&self, participant_id: Option<&ParticipantId>) -> Vec<GameEvent> {
        let mut events = vec![GameEvent::Config(self.config.clone())];
        if let Some(session) = &self.session {
            events.push(self.session_state_event());
            events.push(self.order_books_event());
            if session.status == SessionStatus::Running {
                events.push(self.timer_event());
            }
            if let Some(pid) = participant_id {
                if let Some(view) = self.player_state_view(pid) {
                    events.push(GameEvent::PlayerState(view));
                }
            }
        }
        events
    }

    // ── internal ────────────────────────────────────────────────────

    /// End the running session: sweep books, score, emit end events
    fn end_session(
        &mut self,
    ) -> (
        Vec<Order>,
        Vec<types::events::FinalScoreView>,
        Vec<OutboundEvent>,
    ) {
        let cancelled = self.engine.sweep_session(&mut self.ledger);

        let Some(session) = self.session.as_mut() else {
            return (cancelled, Vec::new(), Vec::new());
        };
        session.status = SessionStatus::Ended;
        session.ended_at = Some(Utc::now());
        let admission_order = session.participants.clone();
        tracing::info!(session_id = %session.session_id, "session ended");

        let (leaderboard, scores) =
            scoring::final_leaderboard(&admission_order, &self.ledger, &self.config);

        let mut events = vec![
            OutboundEvent::broadcast(self.order_books_event()),
            OutboundEvent::broadcast(self.session_state_event()),
            OutboundEvent::broadcast(GameEvent::Leaderboard(leaderboard.clone())),
            OutboundEvent::broadcast(GameEvent::GameEnded { leaderboard }),
        ];
        for score in &scores {
            events.push(OutboundEvent::targeted(
                score.participant_id,
                GameEvent::FinalScore(score.clone()),
            ));
        }

        (cancelled, scores, events)
    }

    fn require_running(&self) -> Result<SessionId, GameError> {
        let session = self.session.as_ref().ok_or(StateError::NoSession)?;
        if session.status != SessionStatus::Running {
            return Err(StateError::SessionNotRunning.into());
        }
        Ok(session.session_id)
    }

    fn require_member(&self, participant_id: &ParticipantId) -> Result<(), GameError> {
        let session = self.session.as_ref().ok_or(StateError::NoSession)?;
        if !session.participants.contains(participant_id) {
            return Err(StateError::NotAParticipant.into());
        }
        Ok(())
    }

    /// The submitter plus every counterparty of the produced trades
    fn affected_participants(
        submitter: &ParticipantId,
        trades: &[Trade],
    ) -> Vec<ParticipantId> {
        let mut affected = vec![*submitter];
        for trade in trades {
            for pid in [trade.buyer_id, trade.seller_id] {
                if !affected.contains(&pid) {
                    affected.push(pid);
                }
            }
        }
        affected
    }

    fn trade_views(&self, trades: &[Trade]) -> Vec<TradeView> {
        trades
            .iter()
            .map(|trade| {
                let buyer_name = self
                    .ledger
                    .get(&trade.buyer_id)
                    .map(|p| p.name.as_str())
                    .unwrap_or("");
                let seller_name = self
                    .ledger
                    .get(&trade.seller_id)
                    .map(|p| p.name.as_str())
                    .unwrap_or("");
                trade_view(trade, buyer_name, seller_name)
            })
            .collect()
    }

    fn session_state_event(&self) -> GameEvent {
        let session = self
            .session
            .as_ref()
            .expect("session_state_event requires a session");
        GameEvent::SessionState(SessionStateView {
            session_id: session.session_id,
            status: session.status,
            host: session.host,
            participants: session
                .participants
                .iter()
                .filter_map(|pid| self.ledger.get(pid))
                .map(|p| ParticipantSummary {
                    participant_id: p.participant_id,
                    name: p.name.clone(),
                })
                .collect(),
            created_at: session.created_at,
            started_at: session.started_at,
            ended_at: session.ended_at,
        })
    }

    fn order_books_event(&self) -> GameEvent {
        GameEvent::OrderBooks {
            books: self.engine.depth_snapshots(self.config.show_order_names),
        }
    }

    fn timer_event(&self) -> GameEvent {
        let remaining = self
            .session
            .as_ref()
            .map(|s| s.remaining_seconds())
            .unwrap_or(0);
        GameEvent::Timer(TimerView {
            remaining_seconds: remaining,
        })
    }

    fn live_leaderboard(&self) -> types::events::LeaderboardView {
        let admission_order = self
            .session
            .as_ref()
            .map(|s| s.participants.clone())
            .unwrap_or_default();
        scoring::live_leaderboard(&admission_order, &self.ledger, &self.config)
    }

    /// Targeted projection of one participant's holdings and open orders
    pub fn player_state_view(&self, participant_id: &ParticipantId) -> Option<PlayerStateView> {
        let participant = self.ledger.get(participant_id)?;
        let open_orders = participant
            .open_orders
            .iter()
            .filter_map(|oid| self.engine.order(oid))
            .map(|order| OrderView {
                order_id: order.order_id,
                product: order.product.clone(),
                side: order.side,
                kind: order.kind,
                quantity: order.quantity,
                remaining: order.remaining,
                price: order.price,
                status: order.status,
            })
            .collect();
        Some(PlayerStateView {
            participant_id: participant.participant_id,
            name: participant.name.clone(),
            cash: participant.cash,
            inventory: participant.inventory.clone(),
            open_orders,
            complete_sets: participant.complete_sets(&self.config.set_recipe),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(GameConfig::default(), 42).unwrap()
    }

    fn lobby_with(manager: &mut SessionManager, names: &[&str]) -> Vec<ParticipantId> {
        manager.create_session().unwrap();
        names
            .iter()
            .map(|name| manager.join(name).unwrap().0.participant_id)
            .collect()
    }

    #[test]
    fn test_create_join_start_flow() {
        let mut mgr = manager();
        let pids = lobby_with(&mut mgr, &["alice", "bob"]);

        assert_eq!(mgr.status(), Some(SessionStatus::Lobby));
        assert_eq!(mgr.session().unwrap().host, Some(pids[0]));

        mgr.start(&pids[0]).unwrap();
        assert_eq!(mgr.status(), Some(SessionStatus::Running));
    }

    #[test]
    fn test_create_rejected_while_active() {
        let mut mgr = manager();
        lobby_with(&mut mgr, &["alice"]);

        let err = mgr.create_session().unwrap_err();
        assert!(matches!(
            err,
            GameError::State(StateError::SessionAlreadyActive)
        ));
    }

    #[test]
    fn test_join_requires_lobby() {
        let mut mgr = manager();
        let err = mgr.join("alice").unwrap_err();
        assert!(matches!(err, GameError::State(StateError::NoSession)));

        let pids = lobby_with(&mut mgr, &["alice", "bob"]);
        mgr.start(&pids[0]).unwrap();
        let err = mgr.join("carol").unwrap_err();
        assert!(matches!(err, GameError::State(StateError::SessionNotLobby)));
    }

    #[test]
    fn test_join_name_rules() {
        let mut mgr = manager();
        lobby_with(&mut mgr, &["Alice"]);

        let err = mgr.join("  ").unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::EmptyName)
        ));

        let err = mgr.join("alice").unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::NameTaken(_))
        ));
    }

    #[test]
    fn test_name_reusable_after_lobby_leave() {
        let mut mgr = manager();
        let pids = lobby_with(&mut mgr, &["alice"]);
        mgr.leave(&pids[0]).unwrap();

        assert!(mgr.join("ALICE").is_ok(), "name freed by leaving");
    }

    #[test]
    fn test_session_full() {
        let mut mgr = manager();
        mgr.create_session().unwrap();
        for i in 0..mgr.config().max_players {
            mgr.join(&format!("player{i}")).unwrap();
        }

        let err = mgr.join("latecomer").unwrap_err();
        assert!(matches!(
            err,
            GameError::State(StateError::SessionFull { .. })
        ));
    }

    #[test]
    fn test_start_gating() {
        let mut mgr = manager();
        let pids = lobby_with(&mut mgr, &["alice", "bob"]);

        let err = mgr.start(&pids[1]).unwrap_err();
        assert!(matches!(err, GameError::Auth(AuthError::NotHost)));

        let mut solo = manager();
        let solo_pids = lobby_with(&mut solo, &["alone"]);
        let err = solo.start(&solo_pids[0]).unwrap_err();
        assert!(matches!(err, GameError::State(StateError::TooFewPlayers)));
    }

    #[test]
    fn test_host_moves_when_host_leaves_lobby() {
        let mut mgr = manager();
        let pids = lobby_with(&mut mgr, &["alice", "bob"]);

        mgr.leave(&pids[0]).unwrap();
        assert_eq!(mgr.session().unwrap().host, Some(pids[1]));
    }

    #[test]
    fn test_submit_requires_running_session() {
        let mut mgr = manager();
        let pids = lobby_with(&mut mgr, &["alice", "bob"]);

        let err = mgr
            .submit_order(
                &pids[0],
                Product::new("bread"),
                Side::Buy,
                OrderKind::Limit,
                1,
                Some(2),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::State(StateError::SessionNotRunning)
        ));
    }

    #[test]
    fn test_submit_requires_membership() {
        let mut mgr = manager();
        let pids = lobby_with(&mut mgr, &["alice", "bob"]);
        mgr.start(&pids[0]).unwrap();

        let err = mgr
            .submit_order(
                &ParticipantId::new(),
                Product::new("bread"),
                Side::Buy,
                OrderKind::Limit,
                1,
                Some(2),
            )
            .unwrap_err();
        assert!(matches!(err, GameError::State(StateError::NotAParticipant)));
    }

    #[test]
    fn test_tick_counts_down_and_ends() {
        let mut config = GameConfig::default();
        config.game_duration_seconds = 3;
        let mut mgr = SessionManager::new(config, 42).unwrap();
        mgr.create_session().unwrap();
        let alice = mgr.join("alice").unwrap().0.participant_id;
        mgr.join("bob").unwrap();
        mgr.start(&alice).unwrap();

        let (outcome, _) = mgr.tick();
        assert!(!outcome.ended);
        assert_eq!(outcome.remaining_seconds, 2);

        mgr.tick();
        let (outcome, events) = mgr.tick();
        assert!(outcome.ended);
        assert_eq!(mgr.status(), Some(SessionStatus::Ended));
        assert_eq!(outcome.final_scores.len(), 2);
        assert!(events
            .iter()
            .any(|e| matches!(e.event, GameEvent::GameEnded { .. })));

        // clock is silent after the end
        let (outcome, events) = mgr.tick();
        assert!(!outcome.ended);
        assert!(events.is_empty());
    }

    #[test]
    fn test_end_sweeps_resting_orders() {
        let mut config = GameConfig::default();
        config.game_duration_seconds = 1;
        let mut mgr = SessionManager::new(config, 42).unwrap();
        mgr.create_session().unwrap();
        let alice = mgr.join("alice").unwrap().0.participant_id;
        mgr.join("bob").unwrap();
        mgr.start(&alice).unwrap();

        mgr.submit_order(
            &alice,
            Product::new("bread"),
            Side::Buy,
            OrderKind::Limit,
            1,
            Some(2),
        )
        .unwrap();

        let (outcome, _) = mgr.tick();
        assert!(outcome.ended);
        assert_eq!(outcome.cancelled_orders.len(), 1);
        assert_eq!(mgr.engine().resting_count(), 0);
    }

    #[test]
    fn test_leaderboard_every_fifth_tick() {
        let mut mgr = manager();
        let pids = lobby_with(&mut mgr, &["alice", "bob"]);
        mgr.start(&pids[0]).unwrap();

        for tick in 1..=10u64 {
            let (_, events) = mgr.tick();
            let has_board = events
                .iter()
                .any(|e| matches!(e.event, GameEvent::Leaderboard(_)));
            assert_eq!(has_board, tick % 5 == 0, "tick {tick}");
        }
    }

    #[test]
    fn test_late_submit_after_end() {
        let mut config = GameConfig::default();
        config.game_duration_seconds = 1;
        let mut mgr = SessionManager::new(config, 42).unwrap();
        mgr.create_session().unwrap();
        let alice = mgr.join("alice").unwrap().0.participant_id;
        mgr.join("bob").unwrap();
        mgr.start(&alice).unwrap();
        mgr.tick();

        let err = mgr
            .submit_order(
                &alice,
                Product::new("bread"),
                Side::Buy,
                OrderKind::Limit,
                1,
                Some(2),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::State(StateError::SessionNotRunning)
        ));
    }

    #[test]
    fn test_reset_ends_running_session() {
        let mut mgr = manager();
        let pids = lobby_with(&mut mgr, &["alice", "bob"]);
        mgr.start(&pids[0]).unwrap();

        let (outcome, events) = mgr.reset();
        assert!(outcome.ended_session.is_some());
        assert_eq!(outcome.final_scores.len(), 2);
        assert!(events
            .iter()
            .any(|e| matches!(e.event, GameEvent::GameEnded { .. })));
        assert!(mgr.session().is_none());

        // a new session can be created immediately
        assert!(mgr.create_session().is_ok());
    }

    #[test]
    fn test_disconnect_while_running_keeps_holdings() {
        let mut mgr = manager();
        let pids = lobby_with(&mut mgr, &["alice", "bob"]);
        mgr.start(&pids[0]).unwrap();

        mgr.submit_order(
            &pids[0],
            Product::new("bread"),
            Side::Buy,
            OrderKind::Limit,
            1,
            Some(2),
        )
        .unwrap();

        let (cancelled, _) = mgr.leave(&pids[0]).unwrap();
        assert_eq!(cancelled.len(), 1);
        assert!(
            mgr.ledger().contains(&pids[0]),
            "holdings stay in play for scoring"
        );
    }

    #[test]
    fn test_subscription_snapshot_shape() {
        let mut mgr = manager();
        let events = mgr.subscription_snapshot(None);
        assert_eq!(events.len(), 1, "config only before a session exists");
        assert!(matches!(events[0], GameEvent::Config(_)));

        let pids = lobby_with(&mut mgr, &["alice"]);
        let events = mgr.subscription_snapshot(Some(&pids[0]));
        assert!(matches!(events[0], GameEvent::Config(_)));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::SessionState(_))));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::PlayerState(_))));
    }
}
