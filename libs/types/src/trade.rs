//! Trade execution types
//!
//! A trade is immutable once created. It always executes at the resting
//! (maker) order's price; crossing takers get the price improvement.

use crate::ids::{OrderId, ParticipantId, SessionId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::product::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An executed trade between two orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub session_id: SessionId,

    // Order references
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,

    // Participant references
    pub buyer_id: ParticipantId,
    pub seller_id: ParticipantId,

    pub product: Product,
    pub quantity: Quantity,
    /// Execution price (the resting order's price)
    pub price: Price,
    /// quantity × price
    pub value: u64,

    /// Engine sequence at execution; strictly monotonic per session
    pub executed_seq: u64,
    /// Wall-clock execution time, used only for persisted records
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Create a new trade record
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        buyer_id: ParticipantId,
        seller_id: ParticipantId,
        product: Product,
        quantity: Quantity,
        price: Price,
        executed_seq: u64,
        executed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            session_id,
            buy_order_id,
            sell_order_id,
            buyer_id,
            seller_id,
            product,
            quantity,
            price,
            value: price.notional(quantity),
            executed_seq,
            executed_at,
        }
    }

    /// Check whether a participant was on either side
    pub fn involves(&self, participant_id: &ParticipantId) -> bool {
        &self.buyer_id == participant_id || &self.seller_id == participant_id
    }

    /// No trade may have the same participant on both sides
    pub fn validate_no_self_trade(&self) -> bool {
        self.buyer_id != self.seller_id
    }
}
