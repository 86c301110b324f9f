//! Order book infrastructure
//!
//! One `OrderBook` per product, each holding a bid side and an ask side of
//! FIFO price levels.

pub mod order_book;
pub mod price_level;

pub use order_book::OrderBook;
pub use price_level::{LevelEntry, PriceLevel};
