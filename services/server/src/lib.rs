//! Server runtime for the trading game
//!
//! The transport abstraction lives here: clients hold an [`EngineHandle`]
//! and exchange commands for structured replies; observers subscribe and
//! receive event streams. One engine task owns all game state and handles
//! commands strictly one at a time, so every mutation (match loop,
//! settlement, and event collection included) completes before the next
//! command begins. Persistence appends and observer pushes happen after
//! the mutation, never inside it.

pub mod commands;
pub mod handle;
pub mod runtime;

pub use commands::{Command, SubmitReply};
pub use handle::EngineHandle;
pub use runtime::EngineRuntime;
