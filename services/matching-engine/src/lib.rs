//! Matching engine for the trading game
//!
//! Implements the order books, the price-time priority matching loop, and
//! settlement against the participant ledger.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced (price first, then submission
//!   sequence)
//! - Trades always execute at the resting (maker) order's price
//! - No self-trades; a submission halts when its own order is best opposing
//! - Settlement conserves cash and per-product inventory exactly
//! - A book never holds a filled or cancelled order

pub mod book;
pub mod clock;
pub mod engine;
pub mod ledger;
pub mod matching;

pub use clock::MonotonicClock;
pub use engine::{MatchingEngine, SubmitOutcome};
pub use ledger::Ledger;
