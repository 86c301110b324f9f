//! Client-side handle to the engine task
//!
//! Cloneable; every connection gets one. Each method enqueues a command
//! and awaits its oneshot reply, so callers see a synchronous
//! request/response surface over the sequential engine.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

use market_data::ObserverId;
use types::errors::{GameError, InternalError};
use types::events::GameEvent;
use types::ids::{OrderId, ParticipantId, SessionId};
use types::order::{OrderKind, Side};
use types::participant::Participant;
use types::product::Product;

use crate::commands::{Command, SubmitReply};

/// Sender half of the command queue
#[derive(Clone)]
pub struct EngineHandle {
    tx: UnboundedSender<Command>,
}

impl EngineHandle {
    pub(crate) fn new(tx: UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    /// Raw sender, for the timer task
    pub fn sender(&self) -> UnboundedSender<Command> {
        self.tx.clone()
    }

    async fn request<T>(
        &self,
        command: Command,
        rx: oneshot::Receiver<Result<T, GameError>>,
    ) -> Result<T, GameError> {
        self.tx
            .send(command)
            .map_err(|_| GameError::Internal(InternalError::EngineUnavailable))?;
        rx.await
            .map_err(|_| GameError::Internal(InternalError::EngineUnavailable))?
    }

    pub async fn create_session(&self) -> Result<SessionId, GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::CreateSession { reply: tx }, rx).await
    }

    pub async fn join(&self, name: impl Into<String>) -> Result<Participant, GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(
            Command::Join {
                name: name.into(),
                reply: tx,
            },
            rx,
        )
        .await
    }

    pub async fn leave(&self, participant_id: ParticipantId) -> Result<(), GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(
            Command::Leave {
                participant_id,
                reply: tx,
            },
            rx,
        )
        .await
    }

    pub async fn start(&self, participant_id: ParticipantId) -> Result<(), GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(
            Command::Start {
                participant_id,
                reply: tx,
            },
            rx,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn submit_order(
        &self,
        participant_id: ParticipantId,
        product: Product,
        side: Side,
        kind: OrderKind,
        quantity: u64,
        price: Option<u64>,
    ) -> Result<SubmitReply, GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(
            Command::SubmitOrder {
                participant_id,
                product,
                side,
                kind,
                quantity,
                price,
                reply: tx,
            },
            rx,
        )
        .await
    }

    pub async fn cancel_order(
        &self,
        participant_id: ParticipantId,
        order_id: OrderId,
    ) -> Result<(), GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(
            Command::CancelOrder {
                participant_id,
                order_id,
                reply: tx,
            },
            rx,
        )
        .await
    }

    pub async fn reset(&self) -> Result<(), GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::Reset { reply: tx }, rx).await
    }

    /// Subscribe as an observer, optionally bound to a participant
    ///
    /// The returned receiver starts with the snapshot events (config
    /// first) and then streams everything the observer's scope allows.
    pub async fn subscribe(
        &self,
        participant_id: Option<ParticipantId>,
    ) -> Result<(ObserverId, UnboundedReceiver<GameEvent>), GameError> {
        let (event_tx, event_rx) = unbounded_channel();
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Command::Subscribe {
                participant_id,
                sender: event_tx,
                reply: tx,
            })
            .map_err(|_| GameError::Internal(InternalError::EngineUnavailable))?;
        let observer_id = rx
            .await
            .map_err(|_| GameError::Internal(InternalError::EngineUnavailable))?;
        Ok((observer_id, event_rx))
    }

    pub fn unsubscribe(&self, observer_id: ObserverId) {
        let _ = self.tx.send(Command::Unsubscribe { observer_id });
    }

    /// Report a lost connection for a participant
    pub fn disconnect(&self, participant_id: ParticipantId) {
        let _ = self.tx.send(Command::Disconnect { participant_id });
    }

    /// Inject one tick of game time (tests drive the clock manually)
    pub fn tick(&self) {
        let _ = self.tx.send(Command::Tick);
    }
}
