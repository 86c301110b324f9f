//! Matching engine core
//!
//! Owns the per-product books, the authoritative order table, the trade log
//! and the sequence clock. All mutation happens through `submit`, `cancel`
//! and the sweep operations, each driven to completion by the single writer
//! before the next command runs.
//!
//! Resources are validated twice: once at submission (pre-reservation
//! check) and once inside settlement immediately before each trade applies.
//! Nothing is escrowed for resting orders, so the second check is what
//! keeps the ledger non-negative when a participant rests more than they
//! can cover.

use std::collections::HashMap;

use chrono::Utc;

use types::config::GameConfig;
use types::errors::{AuthError, GameError, StateError, ValidationError};
use types::events::BookDepthView;
use types::ids::{OrderId, ParticipantId, SessionId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderKind, Side};
use types::product::Product;
use types::trade::Trade;

use crate::book::{LevelEntry, OrderBook};
use crate::clock::MonotonicClock;
use crate::ledger::Ledger;
use crate::matching::{crossing, settlement};

/// Synthetic price assigned to an unfilled market-buy remainder
pub const MARKET_BUY_CEILING: u64 = 1_000_000;

/// Synthetic price assigned to an unfilled market-sell remainder
pub const MARKET_SELL_FLOOR: u64 = 1;

/// Pessimistic per-unit cost assumed for market-buy quantity not covered by
/// visible ask liquidity
pub const MARKET_COST_INFLATION: u64 = MARKET_BUY_CEILING;

/// Result of a successful submission
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// The submitted order as stored (filled, resting, or partial)
    pub order: Order,
    /// Trades produced by the matching loop, in execution order
    pub trades: Vec<Trade>,
}

/// Price-time priority matching engine
pub struct MatchingEngine {
    /// Configured product order, used for stable snapshot iteration
    products: Vec<Product>,
    min_order_size: u64,
    max_order_size: u64,
    /// One book per configured product
    books: HashMap<Product, OrderBook>,
    /// Authoritative order table; book entries mirror `remaining`
    orders: HashMap<OrderId, Order>,
    /// Every trade of the current session, in execution order
    trades: Vec<Trade>,
    clock: MonotonicClock,
}

impl MatchingEngine {
    /// Create an engine with one empty book per configured product
    pub fn new(config: &GameConfig) -> Self {
        let books = config
            .products
            .iter()
            .map(|p| (p.clone(), OrderBook::new(p.clone())))
            .collect();
        Self {
            products: config.products.clone(),
            min_order_size: config.min_order_size,
            max_order_size: config.max_order_size,
            books,
            orders: HashMap::new(),
            trades: Vec::new(),
            clock: MonotonicClock::new(),
        }
    }

    /// Submit an order: validate, match, settle, rest the remainder
    ///
    /// Validation short-circuits on the first failure and creates no order.
    /// Once validation passes an order always comes into existence, even if
    /// it rests unfilled.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        ledger: &mut Ledger,
        session_id: SessionId,
        participant_id: ParticipantId,
        product: Product,
        side: Side,
        kind: OrderKind,
        quantity: u64,
        price: Option<u64>,
    ) -> Result<SubmitOutcome, GameError> {
        // 1. product must be configured
        if !self.books.contains_key(&product) {
            return Err(ValidationError::UnknownProduct(product).into());
        }

        // 2. quantity bounds
        if quantity < self.min_order_size || quantity > self.max_order_size {
            return Err(ValidationError::QuantityOutOfBounds {
                quantity,
                min: self.min_order_size,
                max: self.max_order_size,
            }
            .into());
        }
        let quantity = Quantity::try_new(quantity).ok_or(ValidationError::QuantityOutOfBounds {
            quantity: 0,
            min: self.min_order_size,
            max: self.max_order_size,
        })?;

        // 3. limit orders need a positive price; market orders carry none
        let limit_price = match kind {
            OrderKind::Limit => Some(
                price
                    .and_then(Price::try_new)
                    .ok_or(ValidationError::MissingLimitPrice)?,
            ),
            OrderKind::Market => None,
        };

        // 4. pre-reservation check against current balances
        let participant = ledger
            .get(&participant_id)
            .ok_or(StateError::NotAParticipant)?;
        let participant_name = participant.name.clone();
        match side {
            Side::Buy => {
                let required = match limit_price {
                    Some(p) => p.notional(quantity),
                    None => self.estimate_market_buy_cost(&product, quantity.as_u64()),
                };
                if required > participant.cash {
                    return Err(types::errors::ResourceError::InsufficientCash {
                        required,
                        available: participant.cash,
                    }
                    .into());
                }
            }
            Side::Sell => {
                let available = participant.inventory_count(&product);
                if available < quantity.as_u64() {
                    return Err(types::errors::ResourceError::InsufficientInventory {
                        product,
                        required: quantity.as_u64(),
                        available,
                    }
                    .into());
                }
            }
        }

        let created_seq = self.clock.next_seq();
        let mut order = Order::new(
            session_id,
            participant_id,
            participant_name.clone(),
            product.clone(),
            side,
            kind,
            quantity,
            limit_price,
            created_seq,
        );

        // Split borrows: books, orders and clock mutate independently
        let Self {
            books,
            orders,
            clock,
            trades: trade_log,
            ..
        } = self;
        let book = books
            .get_mut(&product)
            .ok_or_else(|| ValidationError::UnknownProduct(product.clone()))?;

        let mut trades: Vec<Trade> = Vec::new();
        while !order.remaining.is_zero() {
            let Some((maker_price, maker_entry)) = book.opposing_best(side) else {
                break;
            };
            let maker = maker_entry.clone();

            // Self-trade prevention: halt, never skip to the next level
            if maker.participant_id == participant_id {
                break;
            }

            if let Some(limit) = limit_price {
                if !crossing::taker_crosses(side, limit, maker_price) {
                    break;
                }
            }

            let trade_qty = order.remaining.min(maker.remaining);
            let (buyer, seller) = match side {
                Side::Buy => (participant_id, maker.participant_id),
                Side::Sell => (maker.participant_id, participant_id),
            };

            // Execution-time re-check; a failure aborts this trade and the
            // rest of the loop, symmetric with the self-trade halt
            if let Err(err) =
                settlement::transfer(ledger, &buyer, &seller, &product, trade_qty, maker_price)
            {
                tracing::error!(
                    %err,
                    order_id = %order.order_id,
                    maker_order_id = %maker.order_id,
                    "settlement re-check failed; halting match loop"
                );
                break;
            }

            let seq = clock.next_seq();
            let (buy_order_id, sell_order_id) = match side {
                Side::Buy => (order.order_id, maker.order_id),
                Side::Sell => (maker.order_id, order.order_id),
            };
            let trade = Trade::new(
                session_id,
                buy_order_id,
                sell_order_id,
                buyer,
                seller,
                product.clone(),
                trade_qty,
                maker_price,
                seq,
                Utc::now(),
            );

            book.reduce_best(side.opposite(), trade_qty);
            match orders.get_mut(&maker.order_id) {
                Some(maker_order) => {
                    maker_order.add_fill(trade.trade_id, trade_qty, maker_price, seq);
                    if maker_order.is_filled() {
                        ledger.remove_open_order(&maker.participant_id, &maker.order_id)?;
                    }
                }
                None => {
                    debug_assert!(false, "book entry without an order table row");
                    tracing::error!(
                        order_id = %maker.order_id,
                        "book entry without an order table row"
                    );
                }
            }
            order.add_fill(trade.trade_id, trade_qty, maker_price, seq);
            ledger.record_trade(&buyer, trade.trade_id)?;
            ledger.record_trade(&seller, trade.trade_id)?;
            tracing::debug!(
                trade_id = %trade.trade_id,
                product = %product,
                quantity = %trade_qty,
                price = %maker_price,
                "trade executed"
            );
            trades.push(trade);
        }

        // Remainder handling: limits rest at their price; market remainders
        // re-price to a synthetic extreme so the book stays all-limit
        if !order.remaining.is_zero() {
            let resting_price = match limit_price {
                Some(p) => p,
                None => {
                    let p = match side {
                        Side::Buy => Price::new(MARKET_BUY_CEILING),
                        Side::Sell => Price::new(MARKET_SELL_FLOOR),
                    };
                    order.assign_resting_price(p, clock.next_seq());
                    p
                }
            };
            book.insert(
                side,
                resting_price,
                LevelEntry {
                    order_id: order.order_id,
                    participant_id,
                    participant_name,
                    remaining: order.remaining,
                    created_seq: order.created_seq,
                },
            );
            ledger.add_open_order(&participant_id, order.order_id)?;
        }

        orders.insert(order.order_id, order.clone());
        trade_log.extend(trades.iter().cloned());

        Ok(SubmitOutcome { order, trades })
    }

    /// Estimate the cost of a market buy against the visible ask queue
    ///
    /// Walks asks in price-time order consuming the requested quantity;
    /// anything the book cannot cover is costed at `MARKET_COST_INFLATION`
    /// per unit so clearly unaffordable orders are rejected up front.
    fn estimate_market_buy_cost(&self, product: &Product, quantity: u64) -> u64 {
        let Some(book) = self.books.get(product) else {
            return quantity * MARKET_COST_INFLATION;
        };
        let mut uncovered = quantity;
        let mut cost = 0u64;
        for (price, entry) in book.iter_side(Side::Sell) {
            if uncovered == 0 {
                break;
            }
            let take = uncovered.min(entry.remaining.as_u64());
            cost += take * price.as_u64();
            uncovered -= take;
        }
        cost + uncovered * MARKET_COST_INFLATION
    }

    /// Cancel a resting order
    ///
    /// Nothing was escrowed, so cancellation has no balance effect.
    pub fn cancel(
        &mut self,
        ledger: &mut Ledger,
        order_id: &OrderId,
        requester: &ParticipantId,
    ) -> Result<Order, GameError> {
        let order = self
            .orders
            .get(order_id)
            .ok_or(StateError::OrderNotFound(*order_id))?;
        if &order.participant_id != requester {
            return Err(AuthError::NotOwner.into());
        }
        if order.status.is_terminal() {
            return Err(StateError::AlreadyTerminal {
                status: order.status,
            }
            .into());
        }

        let seq = self.clock.next_seq();
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or(StateError::OrderNotFound(*order_id))?;
        order.cancel(seq);
        let owner = order.participant_id;
        let product = order.product.clone();
        let cancelled = order.clone();

        if let Some(book) = self.books.get_mut(&product) {
            book.remove(order_id);
        }
        ledger.remove_open_order(&owner, order_id)?;

        Ok(cancelled)
    }

    /// Cancel every resting order of one participant (disconnect handler)
    pub fn sweep_participant(
        &mut self,
        ledger: &mut Ledger,
        participant_id: &ParticipantId,
    ) -> Vec<Order> {
        let open: Vec<OrderId> = ledger
            .get(participant_id)
            .map(|p| p.open_orders.iter().copied().collect())
            .unwrap_or_default();

        let mut cancelled = Vec::new();
        for order_id in open {
            match self.cancel(ledger, &order_id, participant_id) {
                Ok(order) => cancelled.push(order),
                Err(err) => {
                    tracing::warn!(%err, order_id = %order_id, "sweep skipped order");
                }
            }
        }
        cancelled
    }

    /// Cancel every resting order on every book (session end)
    pub fn sweep_session(&mut self, ledger: &mut Ledger) -> Vec<Order> {
        let mut cancelled = Vec::new();
        for product in self.products.clone() {
            let entries = match self.books.get_mut(&product) {
                Some(book) => book.sweep(),
                None => continue,
            };
            for entry in entries {
                let seq = self.clock.next_seq();
                if let Some(order) = self.orders.get_mut(&entry.order_id) {
                    if !order.status.is_terminal() {
                        order.cancel(seq);
                        cancelled.push(order.clone());
                    }
                }
                if let Err(err) = ledger.remove_open_order(&entry.participant_id, &entry.order_id)
                {
                    tracing::warn!(%err, "open-order set out of sync during sweep");
                }
            }
        }
        cancelled
    }

    /// Clear all books, orders and trades for a fresh session
    ///
    /// The sequence clock keeps counting so ordering stays globally
    /// monotonic across resets.
    pub fn reset(&mut self) {
        self.books = self
            .products
            .iter()
            .map(|p| (p.clone(), OrderBook::new(p.clone())))
            .collect();
        self.orders.clear();
        self.trades.clear();
    }

    /// Look up an order by id
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Every trade of the session in execution order
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Depth projections for every book, in configured product order
    pub fn depth_snapshots(&self, reveal_names: bool) -> Vec<BookDepthView> {
        self.products
            .iter()
            .filter_map(|product| self.books.get(product))
            .map(|book| book.depth(reveal_names))
            .collect()
    }

    /// Total resting orders across all books (tests and diagnostics)
    pub fn resting_count(&self) -> usize {
        self.books.values().map(|b| b.resting_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use types::order::OrderStatus;
    use types::participant::Participant;

    fn product(name: &str) -> Product {
        Product::new(name)
    }

    fn join(ledger: &mut Ledger, name: &str, cash: u64, holdings: &[(&str, u64)]) -> ParticipantId {
        let inventory: BTreeMap<Product, u64> = holdings
            .iter()
            .map(|(p, n)| (Product::new(*p), *n))
            .collect();
        ledger.admit(Participant::new(name, cash, inventory))
    }

    fn setup() -> (MatchingEngine, Ledger, SessionId) {
        let engine = MatchingEngine::new(&GameConfig::default());
        (engine, Ledger::new(), SessionId::new())
    }

    #[test]
    fn test_simple_limit_cross() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("bread", 10)]);
        let bob = join(&mut ledger, "bob", 100, &[]);

        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("bread"),
                Side::Sell,
                OrderKind::Limit,
                5,
                Some(3),
            )
            .unwrap();
        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                bob,
                product("bread"),
                Side::Buy,
                OrderKind::Limit,
                5,
                Some(3),
            )
            .unwrap();

        assert_eq!(outcome.trades.len(), 1);
        let trade = &outcome.trades[0];
        assert_eq!(trade.quantity, Quantity::new(5));
        assert_eq!(trade.price, Price::new(3));
        assert_eq!(trade.value, 15);

        assert_eq!(ledger.cash(&alice), Some(15));
        assert_eq!(ledger.inventory(&alice, &product("bread")), Some(5));
        assert_eq!(ledger.cash(&bob), Some(85));
        assert_eq!(ledger.inventory(&bob, &product("bread")), Some(5));

        assert_eq!(outcome.order.status, OrderStatus::Filled);
        assert_eq!(engine.resting_count(), 0, "both orders filled");
    }

    #[test]
    fn test_price_time_priority_at_same_level() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("cheese", 3)]);
        let carol = join(&mut ledger, "carol", 0, &[("cheese", 3)]);
        let dan = join(&mut ledger, "dan", 100, &[]);

        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("cheese"),
                Side::Sell,
                OrderKind::Limit,
                3,
                Some(7),
            )
            .unwrap();
        let carol_outcome = engine
            .submit(
                &mut ledger,
                sid,
                carol,
                product("cheese"),
                Side::Sell,
                OrderKind::Limit,
                3,
                Some(7),
            )
            .unwrap();

        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                dan,
                product("cheese"),
                Side::Buy,
                OrderKind::Limit,
                4,
                Some(7),
            )
            .unwrap();

        assert_eq!(outcome.trades.len(), 2);
        assert_eq!(outcome.trades[0].seller_id, alice, "earlier order first");
        assert_eq!(outcome.trades[0].quantity, Quantity::new(3));
        assert_eq!(outcome.trades[1].seller_id, carol);
        assert_eq!(outcome.trades[1].quantity, Quantity::new(1));

        let carol_order = engine.order(&carol_outcome.order.order_id).unwrap();
        assert_eq!(carol_order.status, OrderStatus::Partial);
        assert_eq!(carol_order.remaining, Quantity::new(2));
    }

    #[test]
    fn test_better_price_beats_earlier_time() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("meat", 2)]);
        let carol = join(&mut ledger, "carol", 0, &[("meat", 2)]);
        let dan = join(&mut ledger, "dan", 100, &[]);

        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("meat"),
                Side::Sell,
                OrderKind::Limit,
                2,
                Some(8),
            )
            .unwrap();
        engine
            .submit(
                &mut ledger,
                sid,
                carol,
                product("meat"),
                Side::Sell,
                OrderKind::Limit,
                2,
                Some(6),
            )
            .unwrap();

        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                dan,
                product("meat"),
                Side::Buy,
                OrderKind::Limit,
                2,
                Some(10),
            )
            .unwrap();

        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].seller_id, carol, "cheaper ask wins");
        assert_eq!(outcome.trades[0].price, Price::new(6));
    }

    #[test]
    fn test_taker_price_improvement() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("meat", 2)]);
        let bob = join(&mut ledger, "bob", 100, &[]);

        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("meat"),
                Side::Sell,
                OrderKind::Limit,
                2,
                Some(5),
            )
            .unwrap();
        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                bob,
                product("meat"),
                Side::Buy,
                OrderKind::Limit,
                2,
                Some(10),
            )
            .unwrap();

        assert_eq!(outcome.trades[0].price, Price::new(5), "maker's price");
        assert_eq!(ledger.cash(&bob), Some(90), "taker pays 10, not 20");
    }

    #[test]
    fn test_self_trade_halts_and_rests() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 100, &[("veggies", 1)]);

        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("veggies"),
                Side::Sell,
                OrderKind::Limit,
                1,
                Some(3),
            )
            .unwrap();
        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("veggies"),
                Side::Buy,
                OrderKind::Limit,
                1,
                Some(3),
            )
            .unwrap();

        assert!(outcome.trades.is_empty(), "no self-trade");
        assert_eq!(outcome.order.status, OrderStatus::Open);
        assert_eq!(engine.resting_count(), 2, "both of alice's orders rest");
        assert_eq!(ledger.cash(&alice), Some(100), "no settlement happened");
    }

    #[test]
    fn test_self_trade_halt_blocks_deeper_levels() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 100, &[("veggies", 1)]);
        let bob = join(&mut ledger, "bob", 0, &[("veggies", 5)]);

        // Alice's own ask is best; Bob's sits behind at a worse price
        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("veggies"),
                Side::Sell,
                OrderKind::Limit,
                1,
                Some(3),
            )
            .unwrap();
        engine
            .submit(
                &mut ledger,
                sid,
                bob,
                product("veggies"),
                Side::Sell,
                OrderKind::Limit,
                5,
                Some(4),
            )
            .unwrap();

        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("veggies"),
                Side::Buy,
                OrderKind::Limit,
                1,
                Some(5),
            )
            .unwrap();

        assert!(
            outcome.trades.is_empty(),
            "halt must not skip past own order to the next level"
        );
    }

    #[test]
    fn test_insufficient_cash_rejected_without_order() {
        let (mut engine, mut ledger, sid) = setup();
        let poor = join(&mut ledger, "poor", 5, &[]);

        let err = engine
            .submit(
                &mut ledger,
                sid,
                poor,
                product("bread"),
                Side::Buy,
                OrderKind::Limit,
                10,
                Some(1),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            GameError::Resource(types::errors::ResourceError::InsufficientCash {
                required: 10,
                available: 5,
            })
        ));
        assert_eq!(engine.resting_count(), 0, "no order was created");
    }

    #[test]
    fn test_insufficient_inventory_rejected() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("bread", 2)]);

        let err = engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("bread"),
                Side::Sell,
                OrderKind::Limit,
                3,
                Some(1),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            GameError::Resource(types::errors::ResourceError::InsufficientInventory { .. })
        ));
    }

    #[test]
    fn test_unknown_product_rejected() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 100, &[]);

        let err = engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("truffles"),
                Side::Buy,
                OrderKind::Limit,
                1,
                Some(1),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::UnknownProduct(_))
        ));
    }

    #[test]
    fn test_quantity_bounds_enforced() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 1_000_000, &[]);

        let err = engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("bread"),
                Side::Buy,
                OrderKind::Limit,
                101,
                Some(1),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::QuantityOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_limit_requires_price() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 100, &[]);

        let err = engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("bread"),
                Side::Buy,
                OrderKind::Limit,
                1,
                None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationError::MissingLimitPrice)
        ));
    }

    #[test]
    fn test_market_buy_fills_across_levels() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("cheese", 4)]);
        let bob = join(&mut ledger, "bob", 100, &[]);

        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("cheese"),
                Side::Sell,
                OrderKind::Limit,
                2,
                Some(5),
            )
            .unwrap();
        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("cheese"),
                Side::Sell,
                OrderKind::Limit,
                2,
                Some(6),
            )
            .unwrap();

        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                bob,
                product("cheese"),
                Side::Buy,
                OrderKind::Market,
                4,
                None,
            )
            .unwrap();

        assert_eq!(outcome.trades.len(), 2);
        assert_eq!(outcome.trades[0].price, Price::new(5));
        assert_eq!(outcome.trades[1].price, Price::new(6));
        assert_eq!(ledger.cash(&bob), Some(100 - 10 - 12));
        assert_eq!(outcome.order.status, OrderStatus::Filled);
        assert!(outcome.order.price.is_none(), "fully filled market order keeps no price");
    }

    #[test]
    fn test_market_buy_estimate_rejects_unaffordable() {
        let (mut engine, mut ledger, sid) = setup();
        let bob = join(&mut ledger, "bob", 100, &[]);

        // Empty book: the whole quantity is costed at the inflation constant
        let err = engine
            .submit(
                &mut ledger,
                sid,
                bob,
                product("cheese"),
                Side::Buy,
                OrderKind::Market,
                1,
                None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::Resource(types::errors::ResourceError::InsufficientCash { .. })
        ));
    }

    #[test]
    fn test_market_sell_remainder_rests_at_floor() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("bread", 5)]);

        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("bread"),
                Side::Sell,
                OrderKind::Market,
                5,
                None,
            )
            .unwrap();

        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.order.status, OrderStatus::Open);
        assert_eq!(outcome.order.price, Some(Price::new(MARKET_SELL_FLOOR)));
        assert_eq!(engine.resting_count(), 1);

        // Late-arriving liquidity fills the rested remainder at its price
        let bob = join(&mut ledger, "bob", 100, &[]);
        let buy = engine
            .submit(
                &mut ledger,
                sid,
                bob,
                product("bread"),
                Side::Buy,
                OrderKind::Limit,
                5,
                Some(2),
            )
            .unwrap();
        assert_eq!(buy.trades.len(), 1);
        assert_eq!(buy.trades[0].price, Price::new(MARKET_SELL_FLOOR));
    }

    #[test]
    fn test_cancel_roundtrip() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("bread", 5)]);

        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("bread"),
                Side::Sell,
                OrderKind::Limit,
                5,
                Some(3),
            )
            .unwrap();
        let oid = outcome.order.order_id;

        let cancelled = engine.cancel(&mut ledger, &oid, &alice).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(engine.resting_count(), 0);
        assert!(ledger.get(&alice).unwrap().open_orders.is_empty());

        // Idempotent: a second cancel reports the terminal state
        let err = engine.cancel(&mut ledger, &oid, &alice).unwrap_err();
        assert!(matches!(
            err,
            GameError::State(StateError::AlreadyTerminal { .. })
        ));
    }

    #[test]
    fn test_cancel_not_owner() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("bread", 5)]);
        let bob = join(&mut ledger, "bob", 100, &[]);

        let outcome = engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("bread"),
                Side::Sell,
                OrderKind::Limit,
                5,
                Some(3),
            )
            .unwrap();

        let err = engine
            .cancel(&mut ledger, &outcome.order.order_id, &bob)
            .unwrap_err();
        assert!(matches!(err, GameError::Auth(AuthError::NotOwner)));
    }

    #[test]
    fn test_cancel_not_found() {
        let (mut engine, mut ledger, _) = setup();
        let alice = join(&mut ledger, "alice", 0, &[]);

        let err = engine
            .cancel(&mut ledger, &OrderId::new(), &alice)
            .unwrap_err();
        assert!(matches!(err, GameError::State(StateError::OrderNotFound(_))));
    }

    #[test]
    fn test_sweep_participant() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 100, &[("bread", 5)]);
        let bob = join(&mut ledger, "bob", 100, &[]);

        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("bread"),
                Side::Sell,
                OrderKind::Limit,
                5,
                Some(3),
            )
            .unwrap();
        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("cheese"),
                Side::Buy,
                OrderKind::Limit,
                2,
                Some(4),
            )
            .unwrap();
        engine
            .submit(
                &mut ledger,
                sid,
                bob,
                product("veggies"),
                Side::Buy,
                OrderKind::Limit,
                1,
                Some(2),
            )
            .unwrap();

        let cancelled = engine.sweep_participant(&mut ledger, &alice);
        assert_eq!(cancelled.len(), 2);
        assert_eq!(engine.resting_count(), 1, "bob's order survives");
    }

    #[test]
    fn test_sweep_session_empties_every_book() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 100, &[("bread", 5)]);
        let bob = join(&mut ledger, "bob", 100, &[]);

        engine
            .submit(
                &mut ledger,
                sid,
                alice,
                product("bread"),
                Side::Sell,
                OrderKind::Limit,
                5,
                Some(3),
            )
            .unwrap();
        engine
            .submit(
                &mut ledger,
                sid,
                bob,
                product("meat"),
                Side::Buy,
                OrderKind::Limit,
                1,
                Some(2),
            )
            .unwrap();

        let cancelled = engine.sweep_session(&mut ledger);
        assert_eq!(cancelled.len(), 2);
        assert_eq!(engine.resting_count(), 0);
        assert!(ledger.get(&alice).unwrap().open_orders.is_empty());
        assert!(ledger.get(&bob).unwrap().open_orders.is_empty());
    }

    #[test]
    fn test_trade_sequences_monotonic() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 0, &[("bread", 10)]);
        let bob = join(&mut ledger, "bob", 100, &[]);

        for _ in 0..3 {
            engine
                .submit(
                    &mut ledger,
                    sid,
                    alice,
                    product("bread"),
                    Side::Sell,
                    OrderKind::Limit,
                    1,
                    Some(2),
                )
                .unwrap();
            engine
                .submit(
                    &mut ledger,
                    sid,
                    bob,
                    product("bread"),
                    Side::Buy,
                    OrderKind::Limit,
                    1,
                    Some(2),
                )
                .unwrap();
        }

        let seqs: Vec<u64> = engine.trades().iter().map(|t| t.executed_seq).collect();
        assert_eq!(seqs.len(), 3);
        assert!(seqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_conservation_across_many_trades() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 50, &[("bread", 10), ("meat", 4)]);
        let bob = join(&mut ledger, "bob", 100, &[("bread", 2)]);

        let cash_before = ledger.total_cash();
        let bread_before = ledger.total_inventory(&product("bread"));

        engine
            .submit(&mut ledger, sid, alice, product("bread"), Side::Sell, OrderKind::Limit, 6, Some(3))
            .unwrap();
        engine
            .submit(&mut ledger, sid, bob, product("bread"), Side::Buy, OrderKind::Limit, 4, Some(3))
            .unwrap();
        engine
            .submit(&mut ledger, sid, bob, product("bread"), Side::Sell, OrderKind::Limit, 5, Some(4))
            .unwrap();
        engine
            .submit(&mut ledger, sid, alice, product("bread"), Side::Buy, OrderKind::Market, 2, None)
            .unwrap();

        assert_eq!(ledger.total_cash(), cash_before);
        assert_eq!(ledger.total_inventory(&product("bread")), bread_before);

        for trade in engine.trades() {
            assert!(trade.validate_no_self_trade());
        }
    }

    #[test]
    fn test_book_purity_after_fills_and_cancels() {
        let (mut engine, mut ledger, sid) = setup();
        let alice = join(&mut ledger, "alice", 100, &[("bread", 10)]);
        let bob = join(&mut ledger, "bob", 100, &[]);

        let resting = engine
            .submit(&mut ledger, sid, alice, product("bread"), Side::Sell, OrderKind::Limit, 5, Some(3))
            .unwrap();
        engine
            .submit(&mut ledger, sid, bob, product("bread"), Side::Buy, OrderKind::Limit, 5, Some(3))
            .unwrap();
        engine.cancel(&mut ledger, &resting.order.order_id, &alice).unwrap_err();

        let depth = engine.depth_snapshots(true);
        for book in depth {
            assert!(book.bids.is_empty());
            assert!(book.asks.is_empty());
        }
    }
}
