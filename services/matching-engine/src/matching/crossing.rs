//! Crossing detection
//!
//! Determines when an incoming limit order is price-compatible with the
//! best resting order on the opposite side. Market orders never consult
//! this; they cross unconditionally.

use types::numeric::Price;
use types::order::Side;

/// Check if a taker's limit price crosses the resting maker's price
///
/// A buy crosses when it bids at least the ask; a sell crosses when it
/// offers at or below the bid. Execution still happens at the maker's
/// price, so any difference is price improvement for the taker.
pub fn taker_crosses(taker_side: Side, taker_price: Price, maker_price: Price) -> bool {
    match taker_side {
        Side::Buy => taker_price >= maker_price,
        Side::Sell => taker_price <= maker_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_crosses_at_or_above_ask() {
        assert!(taker_crosses(Side::Buy, Price::new(5), Price::new(5)));
        assert!(taker_crosses(Side::Buy, Price::new(6), Price::new(5)));
        assert!(!taker_crosses(Side::Buy, Price::new(4), Price::new(5)));
    }

    #[test]
    fn test_sell_crosses_at_or_below_bid() {
        assert!(taker_crosses(Side::Sell, Price::new(5), Price::new(5)));
        assert!(taker_crosses(Side::Sell, Price::new(4), Price::new(5)));
        assert!(!taker_crosses(Side::Sell, Price::new(6), Price::new(5)));
    }
}
