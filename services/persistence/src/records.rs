//! Persisted record shapes
//!
//! Flat, self-contained projections of the domain types: identifiers are
//! opaque strings, timestamps are ISO-8601 UTC, and every monetary or
//! quantity field is an integer. Each record serializes independently so
//! the journal can append them one at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use types::order::{Order, OrderKind, OrderStatus, Side};
use types::participant::Participant;
use types::session::{Session, SessionStatus};
use types::trade::Trade;

/// Session lifecycle moments worth a dedicated event record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    Admission,
    Departure,
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub host_id: Option<String>,
    pub status: SessionStatus,
    pub participant_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub participant_id: String,
    pub session_id: String,
    pub name: String,
    pub cash: u64,
    pub inventory: BTreeMap<String, u64>,
    pub initial_cash: u64,
    pub initial_inventory: BTreeMap<String, u64>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub session_id: String,
    pub participant_id: String,
    pub product: String,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: u64,
    pub remaining: u64,
    pub price: Option<u64>,
    pub status: OrderStatus,
    pub created_seq: u64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: String,
    pub session_id: String,
    pub buy_order_id: String,
    pub sell_order_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub product: String,
    pub quantity: u64,
    pub price: u64,
    pub value: u64,
    pub executed_seq: u64,
    pub executed_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub session_id: String,
    pub kind: SessionEventKind,
    pub participant_id: Option<String>,
    pub participant_name: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// One persisted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum Record {
    Session(SessionRecord),
    Participant(ParticipantRecord),
    Order(OrderRecord),
    Trade(TradeRecord),
    Event(EventRecord),
}

impl Record {
    pub fn session(session: &Session) -> Self {
        Record::Session(SessionRecord {
            session_id: session.session_id.to_string(),
            host_id: session.host.map(|h| h.to_string()),
            status: session.status,
            participant_ids: session.participants.iter().map(|p| p.to_string()).collect(),
            created_at: session.created_at,
            started_at: session.started_at,
            ended_at: session.ended_at,
            recorded_at: Utc::now(),
        })
    }

    pub fn participant(session: &Session, participant: &Participant) -> Self {
        let stringify =
            |m: &BTreeMap<types::product::Product, u64>| -> BTreeMap<String, u64> {
                m.iter().map(|(p, n)| (p.as_str().to_string(), *n)).collect()
            };
        Record::Participant(ParticipantRecord {
            participant_id: participant.participant_id.to_string(),
            session_id: session.session_id.to_string(),
            name: participant.name.clone(),
            cash: participant.cash,
            inventory: stringify(&participant.inventory),
            initial_cash: participant.initial_cash,
            initial_inventory: stringify(&participant.initial_inventory),
            recorded_at: Utc::now(),
        })
    }

    pub fn order(order: &Order) -> Self {
        Record::Order(OrderRecord {
            order_id: order.order_id.to_string(),
            session_id: order.session_id.to_string(),
            participant_id: order.participant_id.to_string(),
            product: order.product.as_str().to_string(),
            side: order.side,
            kind: order.kind,
            quantity: order.quantity.as_u64(),
            remaining: order.remaining.as_u64(),
            price: order.price.map(|p| p.as_u64()),
            status: order.status,
            created_seq: order.created_seq,
            recorded_at: Utc::now(),
        })
    }

    pub fn trade(trade: &Trade) -> Self {
        Record::Trade(TradeRecord {
            trade_id: trade.trade_id.to_string(),
            session_id: trade.session_id.to_string(),
            buy_order_id: trade.buy_order_id.to_string(),
            sell_order_id: trade.sell_order_id.to_string(),
            buyer_id: trade.buyer_id.to_string(),
            seller_id: trade.seller_id.to_string(),
            product: trade.product.as_str().to_string(),
            quantity: trade.quantity.as_u64(),
            price: trade.price.as_u64(),
            value: trade.value,
            executed_seq: trade.executed_seq,
            executed_at: trade.executed_at,
            recorded_at: Utc::now(),
        })
    }

    pub fn event(
        session: &Session,
        kind: SessionEventKind,
        participant: Option<&Participant>,
    ) -> Self {
        Record::Event(EventRecord {
            session_id: session.session_id.to_string(),
            kind,
            participant_id: participant.map(|p| p.participant_id.to_string()),
            participant_name: participant.map(|p| p.name.clone()),
            recorded_at: Utc::now(),
        })
    }

    /// Record type as a string label for logging
    pub fn label(&self) -> &'static str {
        match self {
            Record::Session(_) => "session",
            Record::Participant(_) => "participant",
            Record::Order(_) => "order",
            Record::Trade(_) => "trade",
            Record::Event(_) => "event",
        }
    }
}
