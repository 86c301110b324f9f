//! Matching logic
//!
//! Crossing detection and ledger settlement for the price-time matching
//! loop in `engine`.

pub mod crossing;
pub mod settlement;

pub use crossing::taker_crosses;
