//! Event fan-out for the trading game
//!
//! Observers subscribe with a channel sender and receive coherent
//! point-in-time snapshots: lifecycle state, book depth, player state,
//! leaderboards, timer ticks, trades, and endgame results.
//!
//! Delivery is best-effort per observer. The engine never blocks on a slow
//! observer: the single writer collects outbound events during command
//! handling and hands them to the fanout afterwards, and a closed channel
//! just drops the observer from the registry.

pub mod fanout;

pub use fanout::{EventFanout, ObserverId};
