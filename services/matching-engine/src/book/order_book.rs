//! Per-product order book
//!
//! Two sides of price levels in `BTreeMap`s for deterministic iteration:
//! bids are consumed from the highest price down, asks from the lowest up.
//! The book only ever holds open or partial orders; the engine removes an
//! order the moment it becomes filled or cancelled.

use std::collections::BTreeMap;

use types::events::{BookDepthView, DepthLevelView, DepthOrderView};
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::product::Product;

use super::price_level::{LevelEntry, PriceLevel};

/// Resting limit orders for one product
#[derive(Debug, Clone)]
pub struct OrderBook {
    product: Product,
    /// Buy side; best bid is the highest price
    bids: BTreeMap<Price, PriceLevel>,
    /// Sell side; best ask is the lowest price
    asks: BTreeMap<Price, PriceLevel>,
}

impl OrderBook {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Rest an order at its price, behind everything already there
    pub fn insert(&mut self, side: Side, price: Price, entry: LevelEntry) {
        self.side_mut(side)
            .entry(price)
            .or_insert_with(PriceLevel::new)
            .insert(entry);
    }

    /// Remove an order from either side
    ///
    /// Linear in the number of resting orders, which stays small in a short
    /// game session. Succeeds regardless of the order's status.
    pub fn remove(&mut self, order_id: &OrderId) -> Option<LevelEntry> {
        for levels in [&mut self.bids, &mut self.asks] {
            let mut hit = None;
            for (price, level) in levels.iter_mut() {
                if let Some(entry) = level.remove(order_id) {
                    hit = Some((*price, entry));
                    break;
                }
            }
            if let Some((price, entry)) = hit {
                if levels.get(&price).is_some_and(|l| l.is_empty()) {
                    levels.remove(&price);
                }
                return Some(entry);
            }
        }
        None
    }

    /// Best resting order on a side: best price, then earliest arrival
    pub fn best(&self, side: Side) -> Option<(Price, &LevelEntry)> {
        let level = match side {
            Side::Buy => self.bids.iter().next_back(),
            Side::Sell => self.asks.iter().next(),
        };
        level.and_then(|(price, level)| level.front().map(|entry| (*price, entry)))
    }

    /// Best order a taker on `taker_side` would execute against
    pub fn opposing_best(&self, taker_side: Side) -> Option<(Price, &LevelEntry)> {
        self.best(taker_side.opposite())
    }

    /// Reduce the best order on a side by a fill, dropping emptied levels
    pub fn reduce_best(&mut self, side: Side, by: Quantity) -> bool {
        let levels = self.side_mut(side);
        let best_price = match side {
            Side::Buy => levels.keys().next_back().copied(),
            Side::Sell => levels.keys().next().copied(),
        };
        let Some(price) = best_price else {
            return false;
        };
        let Some(level) = levels.get_mut(&price) else {
            return false;
        };
        let reduced = level.reduce_front(by);
        if level.is_empty() {
            levels.remove(&price);
        }
        reduced
    }

    /// Resting orders on a side in match priority order
    pub fn iter_side(&self, side: Side) -> Box<dyn Iterator<Item = (Price, &LevelEntry)> + '_> {
        match side {
            Side::Buy => Box::new(
                self.bids
                    .iter()
                    .rev()
                    .flat_map(|(price, level)| level.iter().map(move |e| (*price, e))),
            ),
            Side::Sell => Box::new(
                self.asks
                    .iter()
                    .flat_map(|(price, level)| level.iter().map(move |e| (*price, e))),
            ),
        }
    }

    /// Aggregate both sides by price level
    ///
    /// Bids come out descending and asks ascending. Per-order summaries are
    /// included on every level; names appear only when `reveal_names` is set.
    pub fn depth(&self, reveal_names: bool) -> BookDepthView {
        let project = |levels: &BTreeMap<Price, PriceLevel>, descending: bool| {
            let mut rows: Vec<DepthLevelView> = levels
                .iter()
                .map(|(price, level)| DepthLevelView {
                    price: *price,
                    quantity: Quantity::try_new(level.total_quantity())
                        .unwrap_or_else(Quantity::zero),
                    orders: Some(
                        level
                            .iter()
                            .map(|entry| DepthOrderView {
                                quantity: entry.remaining,
                                participant_name: reveal_names
                                    .then(|| entry.participant_name.clone()),
                            })
                            .collect(),
                    ),
                })
                .collect();
            if descending {
                rows.reverse();
            }
            rows
        };

        BookDepthView {
            product: self.product.clone(),
            bids: project(&self.bids, true),
            asks: project(&self.asks, false),
        }
    }

    /// Drain every resting order from both sides
    ///
    /// The caller marks the drained orders cancelled and fixes up open-order
    /// sets; the book itself only forgets them.
    pub fn sweep(&mut self) -> Vec<LevelEntry> {
        let mut drained = Vec::new();
        for levels in [&mut self.bids, &mut self.asks] {
            for (_, level) in levels.iter_mut() {
                drained.append(&mut level.drain());
            }
            levels.clear();
        }
        drained
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Number of resting orders across both sides
    pub fn resting_count(&self) -> usize {
        self.bids
            .values()
            .chain(self.asks.values())
            .map(|level| level.order_count())
            .sum()
    }
}
