//! Participant ledger
//!
//! Single owner of all participant balances. Every mutation goes through a
//! checked operation: debits that would take a balance below zero are
//! refused with a resource error, so conservation bugs surface at the call
//! site instead of corrupting state. Cancelling a resting order has no
//! balance effect because resting orders never escrow resources.

use std::collections::HashMap;

use types::errors::{GameError, InternalError, ResourceError};
use types::ids::{OrderId, ParticipantId, TradeId};
use types::participant::Participant;
use types::product::Product;

/// All participant accounts for the current session
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    accounts: HashMap<ParticipantId, Participant>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    /// Add a participant account; returns its id
    pub fn admit(&mut self, participant: Participant) -> ParticipantId {
        let id = participant.participant_id;
        self.accounts.insert(id, participant);
        id
    }

    /// Remove a participant account (lobby departure)
    pub fn remove(&mut self, participant_id: &ParticipantId) -> Option<Participant> {
        self.accounts.remove(participant_id)
    }

    pub fn get(&self, participant_id: &ParticipantId) -> Option<&Participant> {
        self.accounts.get(participant_id)
    }

    pub fn contains(&self, participant_id: &ParticipantId) -> bool {
        self.accounts.contains_key(participant_id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.accounts.values()
    }

    /// Drop every account (session reset)
    pub fn clear(&mut self) {
        self.accounts.clear();
    }

    /// Case-insensitive name check among currently joined participants
    pub fn name_taken(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.accounts
            .values()
            .any(|p| p.name.to_lowercase() == wanted)
    }

    fn account_mut(
        &mut self,
        participant_id: &ParticipantId,
    ) -> Result<&mut Participant, InternalError> {
        self.accounts
            .get_mut(participant_id)
            .ok_or(InternalError::MissingParticipant(*participant_id))
    }

    /// Current cash balance
    pub fn cash(&self, participant_id: &ParticipantId) -> Option<u64> {
        self.accounts.get(participant_id).map(|p| p.cash)
    }

    /// Current holdings of one product
    pub fn inventory(&self, participant_id: &ParticipantId, product: &Product) -> Option<u64> {
        self.accounts
            .get(participant_id)
            .map(|p| p.inventory_count(product))
    }

    pub fn credit_cash(
        &mut self,
        participant_id: &ParticipantId,
        amount: u64,
    ) -> Result<(), InternalError> {
        let account = self.account_mut(participant_id)?;
        account.cash += amount;
        Ok(())
    }

    pub fn debit_cash(
        &mut self,
        participant_id: &ParticipantId,
        amount: u64,
    ) -> Result<(), GameError> {
        let account = self.account_mut(participant_id)?;
        match account.cash.checked_sub(amount) {
            Some(rest) => {
                account.cash = rest;
                Ok(())
            }
            None => Err(ResourceError::InsufficientCash {
                required: amount,
                available: account.cash,
            }
            .into()),
        }
    }

    pub fn credit_inventory(
        &mut self,
        participant_id: &ParticipantId,
        product: &Product,
        amount: u64,
    ) -> Result<(), InternalError> {
        let account = self.account_mut(participant_id)?;
        *account.inventory.entry(product.clone()).or_insert(0) += amount;
        Ok(())
    }

    pub fn debit_inventory(
        &mut self,
        participant_id: &ParticipantId,
        product: &Product,
        amount: u64,
    ) -> Result<(), GameError> {
        let account = self.account_mut(participant_id)?;
        let held = account.inventory_count(product);
        match held.checked_sub(amount) {
            Some(rest) => {
                account.inventory.insert(product.clone(), rest);
                Ok(())
            }
            None => Err(ResourceError::InsufficientInventory {
                product: product.clone(),
                required: amount,
                available: held,
            }
            .into()),
        }
    }

    pub fn add_open_order(
        &mut self,
        participant_id: &ParticipantId,
        order_id: OrderId,
    ) -> Result<(), InternalError> {
        self.account_mut(participant_id)?.open_orders.insert(order_id);
        Ok(())
    }

    pub fn remove_open_order(
        &mut self,
        participant_id: &ParticipantId,
        order_id: &OrderId,
    ) -> Result<(), InternalError> {
        self.account_mut(participant_id)?.open_orders.remove(order_id);
        Ok(())
    }

    pub fn record_trade(
        &mut self,
        participant_id: &ParticipantId,
        trade_id: TradeId,
    ) -> Result<(), InternalError> {
        self.account_mut(participant_id)?.trade_ids.push(trade_id);
        Ok(())
    }

    /// Complete sets a participant currently holds under the recipe
    pub fn complete_sets(
        &self,
        participant_id: &ParticipantId,
        recipe: &std::collections::BTreeMap<Product, u64>,
    ) -> u64 {
        self.accounts
            .get(participant_id)
            .map(|p| p.complete_sets(recipe))
            .unwrap_or(0)
    }

    /// Scrap value of the participant's admission-time inventory
    pub fn initial_scrap_value(
        &self,
        participant_id: &ParticipantId,
        scrap_values: &std::collections::BTreeMap<Product, u64>,
    ) -> u64 {
        self.accounts
            .get(participant_id)
            .map(|p| p.initial_scrap_value(scrap_values))
            .unwrap_or(0)
    }

    /// Sum of all cash in the ledger (conservation checks)
    pub fn total_cash(&self) -> u64 {
        self.accounts.values().map(|p| p.cash).sum()
    }

    /// Sum of all holdings of one product (conservation checks)
    pub fn total_inventory(&self, product: &Product) -> u64 {
        self.accounts
            .values()
            .map(|p| p.inventory_count(product))
            .sum()
    }
}
