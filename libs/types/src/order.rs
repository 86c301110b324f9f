//! Order lifecycle types
//!
//! An order has immutable identity (owner, product, side, kind, original
//! quantity) and mutable fill state (remaining quantity, status, fill log).
//! Status transitions are driven exclusively by the matching engine.

use crate::ids::{OrderId, ParticipantId, SessionId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::product::Product;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order kind
///
/// The set is closed and small; the matching loop and the remainder policy
/// are the only two places that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Rests at its price if not immediately matched
    Limit,
    /// Matches at any price; an unfilled remainder is re-priced to a
    /// synthetic extreme and rested as an aggressive limit
    Market,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// On the book (or in flight), no fills yet
    Open,
    /// Partially filled, remainder on the book
    Partial,
    /// Completely filled (terminal)
    Filled,
    /// Cancelled by the owner or a sweep (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// One execution against an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub trade_id: TradeId,
    pub quantity: Quantity,
    pub price: Price,
    /// Engine sequence at execution time
    pub seq: u64,
}

/// Complete order structure
///
/// `created_seq` is the engine's monotonic counter at submission and is the
/// tie-breaker for price-time priority; wall clocks are never consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub product: Product,
    pub side: Side,
    pub kind: OrderKind,
    /// Original quantity at submission
    pub quantity: Quantity,
    /// Unfilled quantity
    pub remaining: Quantity,
    /// Limit price; None only while an unmatched market submission is in
    /// flight. A rested market remainder carries its synthetic extreme here.
    pub price: Option<Price>,
    pub status: OrderStatus,
    /// Ordered fill log
    pub fills: Vec<Fill>,
    pub created_seq: u64,
    pub updated_seq: u64,
}

impl Order {
    /// Create a new open order
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        participant_id: ParticipantId,
        participant_name: String,
        product: Product,
        side: Side,
        kind: OrderKind,
        quantity: Quantity,
        price: Option<Price>,
        created_seq: u64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            session_id,
            participant_id,
            participant_name,
            product,
            side,
            kind,
            quantity,
            remaining: quantity,
            price,
            status: OrderStatus::Open,
            fills: Vec::new(),
            created_seq,
            updated_seq: created_seq,
        }
    }

    /// Check fill accounting: remaining = original − Σ fills
    pub fn check_invariant(&self) -> bool {
        let filled: u64 = self.fills.iter().map(|f| f.quantity.as_u64()).sum();
        self.remaining.as_u64() + filled == self.quantity.as_u64()
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Check if order has any fills
    pub fn has_fills(&self) -> bool {
        !self.fills.is_empty()
    }

    /// Append a fill and recompute status
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity
    pub fn add_fill(&mut self, trade_id: TradeId, quantity: Quantity, price: Price, seq: u64) {
        let remaining = self
            .remaining
            .checked_sub(quantity)
            .expect("Fill would exceed remaining quantity");

        self.remaining = remaining;
        self.fills.push(Fill {
            trade_id,
            quantity,
            price,
            seq,
        });

        self.status = if self.remaining.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
        self.updated_seq = seq;

        assert!(self.check_invariant(), "Invariant violated after fill");
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if the order is already in a terminal state
    pub fn cancel(&mut self, seq: u64) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");

        self.status = OrderStatus::Cancelled;
        self.updated_seq = seq;
    }

    /// Re-price an unfilled market remainder before resting it
    pub fn assign_resting_price(&mut self, price: Price, seq: u64) {
        self.price = Some(price);
        self.updated_seq = seq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order(qty: u64) -> Order {
        Order::new(
            SessionId::new(),
            ParticipantId::new(),
            "alice".to_string(),
            Product::new("bread"),
            Side::Buy,
            OrderKind::Limit,
            Quantity::new(qty),
            Some(Price::new(3)),
            1,
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_order_creation() {
        let order = sample_order(5);
        assert_eq!(order.status, OrderStatus::Open);
        assert!(order.check_invariant());
        assert!(!order.has_fills());
    }

    #[test]
    fn test_order_fill_transitions() {
        let mut order = sample_order(5);

        order.add_fill(TradeId::new(), Quantity::new(2), Price::new(3), 2);
        assert_eq!(order.status, OrderStatus::Partial);
        assert_eq!(order.remaining, Quantity::new(3));
        assert!(order.check_invariant());

        order.add_fill(TradeId::new(), Quantity::new(3), Price::new(3), 3);
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.is_filled());
        assert!(order.check_invariant());
    }

    #[test]
    #[should_panic(expected = "Fill would exceed remaining quantity")]
    fn test_order_overfill_panics() {
        let mut order = sample_order(2);
        order.add_fill(TradeId::new(), Quantity::new(3), Price::new(3), 2);
    }

    #[test]
    fn test_order_cancel() {
        let mut order = sample_order(5);
        order.cancel(7);
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.status.is_terminal());
        assert_eq!(order.updated_seq, 7);
    }

    #[test]
    #[should_panic(expected = "Cannot cancel terminal order")]
    fn test_cancel_terminal_panics() {
        let mut order = sample_order(1);
        order.add_fill(TradeId::new(), Quantity::new(1), Price::new(3), 2);
        order.cancel(3);
    }

    #[test]
    fn test_market_remainder_repricing() {
        let mut order = Order::new(
            SessionId::new(),
            ParticipantId::new(),
            "bob".to_string(),
            Product::new("meat"),
            Side::Buy,
            OrderKind::Market,
            Quantity::new(2),
            None,
            1,
        );
        assert!(order.price.is_none());

        order.assign_resting_price(Price::new(1_000_000), 2);
        assert_eq!(order.price, Some(Price::new(1_000_000)));
    }

    #[test]
    fn test_order_serialization() {
        let order = sample_order(4);
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
