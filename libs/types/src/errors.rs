//! Error taxonomy for the game server
//!
//! Command handlers always reply with a structured result; nothing raises
//! across the engine/transport boundary. The layering mirrors the taxonomy:
//! validation, authorization, state, resource, and internal kinds.

use crate::ids::{OrderId, ParticipantId};
use crate::order::OrderStatus;
use crate::product::Product;
use thiserror::Error;

/// Top-level error for every command reply
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),
}

/// Input that can never be accepted regardless of state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown product: {0}")]
    UnknownProduct(Product),

    #[error("Quantity {quantity} outside allowed range [{min}, {max}]")]
    QuantityOutOfBounds { quantity: u64, min: u64, max: u64 },

    #[error("Limit orders require a positive price")]
    MissingLimitPrice,

    #[error("Display name must not be empty")]
    EmptyName,

    #[error("Display name already taken: {0}")]
    NameTaken(String),
}

/// Requests the requester is not allowed to make
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Only the order owner may cancel it")]
    NotOwner,

    #[error("Only the host may start the session")]
    NotHost,
}

/// Requests that conflict with the current lifecycle state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("No session exists")]
    NoSession,

    #[error("A session is already active")]
    SessionAlreadyActive,

    #[error("Session is not in the lobby")]
    SessionNotLobby,

    #[error("Session is not running")]
    SessionNotRunning,

    #[error("Session is full ({max_players} players)")]
    SessionFull { max_players: u32 },

    #[error("At least 2 players are required to start")]
    TooFewPlayers,

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Order already in terminal state: {status:?}")]
    AlreadyTerminal { status: OrderStatus },

    #[error("Participant is not part of this session")]
    NotAParticipant,
}

/// Requests the participant cannot afford
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Insufficient cash: required {required}, available {available}")]
    InsufficientCash { required: u64, available: u64 },

    #[error("Insufficient {product}: required {required}, available {available}")]
    InsufficientInventory {
        product: Product,
        required: u64,
        available: u64,
    },
}

/// Engine discipline violations; indicate a bug, never user error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalError {
    #[error("Ledger balance would go below zero for {participant_id}")]
    LedgerUnderflow { participant_id: ParticipantId },

    #[error("Participant missing from ledger: {0}")]
    MissingParticipant(ParticipantId),

    #[error("Order table entry missing: {0}")]
    MissingOrder(OrderId),

    #[error("Engine task is not running")]
    EngineUnavailable,
}
