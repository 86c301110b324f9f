//! Observer-facing events and snapshot shapes
//!
//! Every event is a coherent point-in-time projection of engine state.
//! Observers never receive deltas that require client-side reconciliation;
//! a fresh snapshot always supersedes the previous one wholesale.

use crate::config::GameConfig;
use crate::ids::{OrderId, ParticipantId, SessionId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::{OrderKind, OrderStatus, Side};
use crate::product::Product;
use crate::session::SessionStatus;
use crate::trade::Trade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Participant identity as shown to other observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub participant_id: ParticipantId,
    pub name: String,
}

/// Session lifecycle projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStateView {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub host: Option<ParticipantId>,
    pub participants: Vec<ParticipantSummary>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// One open order as shown to its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub order_id: OrderId,
    pub product: Product,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Quantity,
    pub remaining: Quantity,
    pub price: Option<Price>,
    pub status: OrderStatus,
}

/// Targeted projection of one participant's holdings and open orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStateView {
    pub participant_id: ParticipantId,
    pub name: String,
    pub cash: u64,
    pub inventory: BTreeMap<Product, u64>,
    pub open_orders: Vec<OrderView>,
    pub complete_sets: u64,
}

/// One order inside a depth level
///
/// `participant_name` is present only when the configuration reveals names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthOrderView {
    pub quantity: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
}

/// Aggregated quantity at one price level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevelView {
    pub price: Price,
    pub quantity: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<DepthOrderView>>,
}

/// Both sides of one product's book, bids descending and asks ascending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDepthView {
    pub product: Product,
    pub bids: Vec<DepthLevelView>,
    pub asks: Vec<DepthLevelView>,
}

/// One leaderboard row
///
/// During a running session `score` is the estimated value
/// (cash + current scrap); at the end it is the realized total score and
/// `pnl` is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub participant_id: ParticipantId,
    pub name: String,
    pub score: u64,
    pub complete_sets: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<i64>,
}

/// Ranked standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardView {
    pub rows: Vec<LeaderboardRow>,
    /// True only for the endgame leaderboard
    pub is_final: bool,
}

/// Game clock projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub remaining_seconds: u64,
}

/// Public projection of one trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeView {
    pub trade_id: TradeId,
    pub product: Product,
    pub quantity: Quantity,
    pub price: Price,
    pub value: u64,
    pub buyer: ParticipantSummary,
    pub seller: ParticipantSummary,
}

/// Targeted endgame accounting for one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScoreView {
    pub participant_id: ParticipantId,
    pub name: String,
    pub cash: u64,
    pub complete_sets: u64,
    pub sets_value: u64,
    pub leftover_inventory: BTreeMap<Product, u64>,
    pub scrap_value: u64,
    pub total_score: u64,
    pub pnl: i64,
}

/// All events pushed to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Sent once on subscribe
    Config(GameConfig),
    /// Sent on every lifecycle transition and participant-set change
    SessionState(SessionStateView),
    /// Targeted; sent after any mutation affecting the participant
    PlayerState(PlayerStateView),
    /// Sent after every book mutation
    OrderBooks { books: Vec<BookDepthView> },
    /// Sent every fifth timer tick while running, and at the end
    Leaderboard(LeaderboardView),
    /// Sent every timer tick
    Timer(TimerView),
    /// Batch of trades produced by one submission
    Trades { trades: Vec<TradeView> },
    /// Sent once when the session ends, with the final standings
    GameEnded { leaderboard: LeaderboardView },
    /// Targeted endgame accounting
    FinalScore(FinalScoreView),
}

impl GameEvent {
    /// Event type as a string label for logging
    pub fn label(&self) -> &'static str {
        match self {
            GameEvent::Config(_) => "config",
            GameEvent::SessionState(_) => "session_state",
            GameEvent::PlayerState(_) => "player_state",
            GameEvent::OrderBooks { .. } => "order_books",
            GameEvent::Leaderboard(_) => "leaderboard",
            GameEvent::Timer(_) => "timer",
            GameEvent::Trades { .. } => "trades",
            GameEvent::GameEnded { .. } => "game_ended",
            GameEvent::FinalScore(_) => "final_score",
        }
    }
}

/// Delivery scope of an outbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// Every observer of the session
    Broadcast,
    /// Only observers bound to this participant
    Participant(ParticipantId),
}

/// An event paired with its delivery scope
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEvent {
    pub scope: EventScope,
    pub event: GameEvent,
}

impl OutboundEvent {
    pub fn broadcast(event: GameEvent) -> Self {
        Self {
            scope: EventScope::Broadcast,
            event,
        }
    }

    pub fn targeted(participant_id: ParticipantId, event: GameEvent) -> Self {
        Self {
            scope: EventScope::Participant(participant_id),
            event,
        }
    }
}

/// Build the public projection of a trade
pub fn trade_view(trade: &Trade, buyer_name: &str, seller_name: &str) -> TradeView {
    TradeView {
        trade_id: trade.trade_id,
        product: trade.product.clone(),
        quantity: trade.quantity,
        price: trade.price,
        value: trade.value,
        buyer: ParticipantSummary {
            participant_id: trade.buyer_id,
            name: buyer_name.to_string(),
        },
        seller: ParticipantSummary {
            participant_id: trade.seller_id,
            name: seller_name.to_string(),
        },
    }
}
