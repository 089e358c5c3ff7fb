//! Cloneable façade for feeding connection traffic into the runtime.
//!
//! [`SessionHandle`] hides channel plumbing and offers async helpers for the
//! transport (item batches, connection events) and for the game integration
//! (queries, hint updates, event streams).
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use multiworld_core::{
    HintRecord, HintStatus, LocationId, ReceivedItem, ReceivedItemsPacket, SlotId,
    UpdateHintPacket,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::ledger::Generation;
use crate::workers::{Command, SessionStatus};

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Apply a `ReceivedItems` batch starting at `packet.index`.
    ///
    /// Fails without touching the log when any sender cannot be resolved.
    pub async fn received_items(&self, packet: ReceivedItemsPacket) -> Result<()> {
        self.request(|reply| Command::ReceivedItems { packet, reply })
            .await?
    }

    /// Signal a new connection.
    ///
    /// Clears all session state and starts the hint subscription. The
    /// returned [`HintSubscription`] resolves once the initial hint snapshot
    /// has been applied.
    pub async fn connected(&self) -> Result<HintSubscription> {
        self.request(|reply| Command::Connected { reply }).await?
    }

    /// The received log. `None` marks indices the server skipped.
    pub async fn received(&self) -> Result<Vec<Option<ReceivedItem>>> {
        self.request(|reply| Command::QueryReceived { reply }).await
    }

    pub async fn received_item(&self, index: usize) -> Result<ReceivedItem> {
        self.request(|reply| Command::QueryReceivedItem { index, reply })
            .await?
    }

    /// Hints in arrival order.
    pub async fn hints(&self) -> Result<Vec<HintRecord>> {
        self.request(|reply| Command::QueryHints { reply }).await
    }

    /// Next expected item index.
    pub async fn count(&self) -> Result<usize> {
        Ok(self.status().await?.item_count)
    }

    pub async fn hints_initialized(&self) -> Result<bool> {
        Ok(self.status().await?.hints_initialized)
    }

    pub async fn generation(&self) -> Result<Generation> {
        Ok(self.status().await?.generation)
    }

    pub async fn status(&self) -> Result<SessionStatus> {
        self.request(|reply| Command::QueryStatus { reply }).await
    }

    /// Build an `UpdateHint` request for the hint of `player`'s `location`.
    ///
    /// Only validates against local state; the server has the final say.
    pub async fn prepare_hint_update(
        &self,
        player: SlotId,
        location: LocationId,
        status: HintStatus,
    ) -> Result<UpdateHintPacket> {
        self.request(|reply| Command::PrepareHintUpdate {
            player,
            location,
            status,
            reply,
        })
        .await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Items` - Item batches written to the received log
    /// - `Topic::Hints` - Hint snapshot, new hints, and status changes
    /// - `Topic::Session` - Connection resets
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use multiworld_runtime::{Event, Topic};
    ///
    /// let mut items = handle.subscribe(Topic::Items);
    /// while let Ok(Event::Items(event)) = items.recv().await {
    ///     // Hand the items to the game
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}

/// Pending initial hint snapshot of one connection.
///
/// Dropping it is allowed; a failed snapshot is then only logged.
#[derive(Debug)]
pub struct HintSubscription {
    generation: Generation,
    key: String,
    reply_rx: oneshot::Receiver<Result<()>>,
}

impl HintSubscription {
    pub(crate) fn new(
        generation: Generation,
        key: String,
        reply_rx: oneshot::Receiver<Result<()>>,
    ) -> Self {
        Self {
            generation,
            key,
            reply_rx,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Storage key the hints are read from.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Wait for the snapshot to be applied.
    ///
    /// Fails with [`RuntimeError::HintSnapshot`] when the store request
    /// failed, and with [`RuntimeError::Superseded`] when another connection
    /// started first.
    pub async fn initialized(self) -> Result<()> {
        self.reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }
}
