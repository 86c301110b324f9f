//! Command surface
//!
//! Every client request is a `Command` carrying a oneshot reply sender, so
//! replies are synchronous from the client's point of view while the
//! engine stays a single sequential consumer.

use tokio::sync::{mpsc::UnboundedSender, oneshot};

use market_data::ObserverId;
use types::errors::GameError;
use types::events::GameEvent;
use types::ids::{OrderId, ParticipantId, SessionId};
use types::order::{Order, OrderKind, Side};
use types::participant::Participant;
use types::product::Product;
use types::trade::Trade;

/// Reply payload of a successful submission
#[derive(Debug, Clone)]
pub struct SubmitReply {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// All commands the engine task accepts
pub enum Command {
    CreateSession {
        reply: oneshot::Sender<Result<SessionId, GameError>>,
    },
    Join {
        name: String,
        reply: oneshot::Sender<Result<Participant, GameError>>,
    },
    Leave {
        participant_id: ParticipantId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Start {
        participant_id: ParticipantId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    SubmitOrder {
        participant_id: ParticipantId,
        product: Product,
        side: Side,
        kind: OrderKind,
        quantity: u64,
        price: Option<u64>,
        reply: oneshot::Sender<Result<SubmitReply, GameError>>,
    },
    CancelOrder {
        participant_id: ParticipantId,
        order_id: OrderId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Reset {
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    /// Register an observer; initial snapshot events are pushed before the
    /// reply resolves
    Subscribe {
        participant_id: Option<ParticipantId>,
        sender: UnboundedSender<GameEvent>,
        reply: oneshot::Sender<ObserverId>,
    },
    Unsubscribe {
        observer_id: ObserverId,
    },
    /// Connection loss; sweeps the participant's resting orders
    Disconnect {
        participant_id: ParticipantId,
    },
    /// One second of game time
    Tick,
}

impl Command {
    /// Command name for logging
    pub fn label(&self) -> &'static str {
        match self {
            Command::CreateSession { .. } => "create_session",
            Command::Join { .. } => "join",
            Command::Leave { .. } => "leave",
            Command::Start { .. } => "start",
            Command::SubmitOrder { .. } => "submit_order",
            Command::CancelOrder { .. } => "cancel_order",
            Command::Reset { .. } => "reset",
            Command::Subscribe { .. } => "subscribe",
            Command::Unsubscribe { .. } => "unsubscribe",
            Command::Disconnect { .. } => "disconnect",
            Command::Tick => "tick",
        }
    }
}
