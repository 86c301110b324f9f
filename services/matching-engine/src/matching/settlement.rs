//! Trade settlement against the ledger
//!
//! One function owns the double-entry transfer: buyer cash and seller
//! inventory are re-checked immediately before mutation, so a settlement
//! either applies in full or leaves the ledger untouched. A failure here
//! means an earlier accounting step went wrong; the engine logs it and
//! halts the submission's matching loop.

use types::errors::{GameError, ResourceError};
use types::ids::ParticipantId;
use types::numeric::{Price, Quantity};
use types::product::Product;

use crate::ledger::Ledger;

/// Atomically settle one trade: cash buyer→seller, inventory seller→buyer
///
/// Returns the trade value on success. On any check failure the ledger is
/// unchanged.
pub fn transfer(
    ledger: &mut Ledger,
    buyer: &ParticipantId,
    seller: &ParticipantId,
    product: &Product,
    quantity: Quantity,
    price: Price,
) -> Result<u64, GameError> {
    let value = price.notional(quantity);

    // Re-check both resources before touching anything
    let buyer_cash = ledger
        .cash(buyer)
        .ok_or(types::errors::InternalError::MissingParticipant(*buyer))?;
    if buyer_cash < value {
        return Err(ResourceError::InsufficientCash {
            required: value,
            available: buyer_cash,
        }
        .into());
    }
    let seller_held = ledger
        .inventory(seller, product)
        .ok_or(types::errors::InternalError::MissingParticipant(*seller))?;
    if seller_held < quantity.as_u64() {
        return Err(ResourceError::InsufficientInventory {
            product: product.clone(),
            required: quantity.as_u64(),
            available: seller_held,
        }
        .into());
    }

    ledger.debit_cash(buyer, value)?;
    ledger.credit_cash(seller, value)?;
    ledger.debit_inventory(seller, product, quantity.as_u64())?;
    ledger.credit_inventory(buyer, product, quantity.as_u64())?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use types::participant::Participant;

    fn meat() -> Product {
        Product::new("meat")
    }

    fn setup() -> (Ledger, ParticipantId, ParticipantId) {
        let mut ledger = Ledger::new();
        let buyer = ledger.admit(Participant::new("buyer", 100, BTreeMap::new()));
        let mut inventory = BTreeMap::new();
        inventory.insert(meat(), 10);
        let seller = ledger.admit(Participant::new("seller", 0, inventory));
        (ledger, buyer, seller)
    }

    #[test]
    fn test_transfer_moves_both_legs() {
        let (mut ledger, buyer, seller) = setup();

        let value = transfer(
            &mut ledger,
            &buyer,
            &seller,
            &meat(),
            Quantity::new(4),
            Price::new(5),
        )
        .unwrap();

        assert_eq!(value, 20);
        assert_eq!(ledger.cash(&buyer), Some(80));
        assert_eq!(ledger.cash(&seller), Some(20));
        assert_eq!(ledger.inventory(&buyer, &meat()), Some(4));
        assert_eq!(ledger.inventory(&seller, &meat()), Some(6));
    }

    #[test]
    fn test_transfer_conserves_totals() {
        let (mut ledger, buyer, seller) = setup();
        let cash_before = ledger.total_cash();
        let meat_before = ledger.total_inventory(&meat());

        transfer(
            &mut ledger,
            &buyer,
            &seller,
            &meat(),
            Quantity::new(2),
            Price::new(7),
        )
        .unwrap();

        assert_eq!(ledger.total_cash(), cash_before);
        assert_eq!(ledger.total_inventory(&meat()), meat_before);
    }

    #[test]
    fn test_transfer_rejects_poor_buyer_without_mutation() {
        let (mut ledger, buyer, seller) = setup();

        let result = transfer(
            &mut ledger,
            &buyer,
            &seller,
            &meat(),
            Quantity::new(10),
            Price::new(50),
        );

        assert!(result.is_err());
        assert_eq!(ledger.cash(&buyer), Some(100));
        assert_eq!(ledger.inventory(&seller, &meat()), Some(10));
    }

    #[test]
    fn test_transfer_rejects_bare_seller_without_mutation() {
        let (mut ledger, buyer, seller) = setup();

        let result = transfer(
            &mut ledger,
            &buyer,
            &seller,
            &meat(),
            Quantity::new(11),
            Price::new(1),
        );

        assert!(result.is_err());
        assert_eq!(ledger.cash(&buyer), Some(100));
        assert_eq!(ledger.inventory(&seller, &meat()), Some(10));
    }
}
