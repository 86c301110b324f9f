//! Participant ledger state
//!
//! A participant is created on admission in the lobby, mutated only by the
//! engine through settlement and cancels, and frozen once the session ends.
//! The initial cash/inventory snapshot is immutable and feeds PnL at scoring.

use crate::ids::{OrderId, ParticipantId, TradeId};
use crate::product::Product;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A participant and their holdings
///
/// Maps use BTree containers for deterministic iteration in snapshots and
/// persisted records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub participant_id: ParticipantId,
    /// Display name; unique case-insensitively among joined participants
    pub name: String,
    /// Cash balance, non-negative
    pub cash: u64,
    /// Product holdings, all counts non-negative
    pub inventory: BTreeMap<Product, u64>,
    /// Ids of orders currently resting on a book
    pub open_orders: BTreeSet<OrderId>,
    /// Every trade this participant was party to, in execution order
    pub trade_ids: Vec<TradeId>,
    /// Cash at admission (immutable)
    pub initial_cash: u64,
    /// Inventory at admission (immutable)
    pub initial_inventory: BTreeMap<Product, u64>,
}

impl Participant {
    /// Create a participant with a starting cash and inventory snapshot
    pub fn new(name: impl Into<String>, cash: u64, inventory: BTreeMap<Product, u64>) -> Self {
        Self {
            participant_id: ParticipantId::new(),
            name: name.into(),
            cash,
            initial_cash: cash,
            initial_inventory: inventory.clone(),
            inventory,
            open_orders: BTreeSet::new(),
            trade_ids: Vec::new(),
        }
    }

    /// Units held of a product (0 if never held)
    pub fn inventory_count(&self, product: &Product) -> u64 {
        self.inventory.get(product).copied().unwrap_or(0)
    }

    /// Scrap value of an inventory under the given per-unit values
    pub fn scrap_value_of(
        inventory: &BTreeMap<Product, u64>,
        scrap_values: &BTreeMap<Product, u64>,
    ) -> u64 {
        inventory
            .iter()
            .map(|(product, count)| count * scrap_values.get(product).copied().unwrap_or(0))
            .sum()
    }

    /// Scrap value of the current holdings
    pub fn current_scrap_value(&self, scrap_values: &BTreeMap<Product, u64>) -> u64 {
        Self::scrap_value_of(&self.inventory, scrap_values)
    }

    /// Scrap value of the admission-time holdings
    pub fn initial_scrap_value(&self, scrap_values: &BTreeMap<Product, u64>) -> u64 {
        Self::scrap_value_of(&self.initial_inventory, scrap_values)
    }

    /// Complete sets held: min over the recipe of floor(held / required)
    pub fn complete_sets(&self, recipe: &BTreeMap<Product, u64>) -> u64 {
        recipe
            .iter()
            .map(|(product, required)| {
                if *required == 0 {
                    u64::MAX
                } else {
                    self.inventory_count(product) / required
                }
            })
            .min()
            .unwrap_or(0)
    }
}
