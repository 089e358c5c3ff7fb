//! Session worker that owns the authoritative [`SessionLedger`].
//!
//! Receives commands from [`SessionHandle`](crate::SessionHandle), applies
//! item batches and hint notifications to the ledger, and publishes
//! [`Event`](crate::Event) notifications. Every mutation happens inside a
//! single handler call on this task.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use multiworld_core::{
    HintRecord, HintStatus, LocationId, NetworkHint, ReceivedItem, ReceivedItemsPacket, SlotId,
    UpdateHintPacket, read_hints_key,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, trace, warn};

use crate::api::{HintSubscription, Result, RuntimeError};
use crate::events::{EventBus, HintEvent, ItemEvent, SessionEvent};
use crate::ledger::{Generation, SessionLedger};
use crate::roster::{PlayerResolver, resolve_items};
use crate::storage::{DataChangeCallback, DataSnapshot, DataStorage, StorageError};

/// Commands that can be sent to the session worker
pub enum Command {
    /// Apply an item batch from the transport.
    ReceivedItems {
        packet: ReceivedItemsPacket,
        reply: oneshot::Sender<Result<()>>,
    },
    /// A connection was established: reset and resubscribe to hints.
    Connected {
        reply: oneshot::Sender<Result<HintSubscription>>,
    },
    /// Copy of the received log, gaps included.
    QueryReceived {
        reply: oneshot::Sender<Vec<Option<ReceivedItem>>>,
    },
    /// One received item by index.
    QueryReceivedItem {
        index: usize,
        reply: oneshot::Sender<Result<ReceivedItem>>,
    },
    /// Copy of the hint set in arrival order.
    QueryHints {
        reply: oneshot::Sender<Vec<HintRecord>>,
    },
    QueryStatus {
        reply: oneshot::Sender<SessionStatus>,
    },
    /// Validate a hint status change against local state.
    PrepareHintUpdate {
        player: SlotId,
        location: LocationId,
        status: HintStatus,
        reply: oneshot::Sender<Result<UpdateHintPacket>>,
    },
}

/// Counters describing the current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub generation: Generation,
    /// Positional length of the received log.
    pub item_count: usize,
    /// Written slots of the received log.
    pub items_delivered: usize,
    pub hint_count: usize,
    pub hints_initialized: bool,
}

/// Messages produced by the storage collaborator, tagged with the generation
/// of the subscription that produced them.
pub(crate) enum HintMessage {
    Snapshot {
        generation: Generation,
        key: String,
        result: std::result::Result<DataSnapshot, StorageError>,
        reply: oneshot::Sender<Result<()>>,
    },
    Changed {
        generation: Generation,
        key: String,
        value: Value,
    },
}

/// Background task that reconciles server deliveries into the ledger.
pub struct SessionWorker {
    ledger: SessionLedger,
    /// Generation read by change callbacks so superseded ones stay silent.
    current: Arc<AtomicU64>,
    /// Hint changes for the current generation that arrived before its
    /// snapshot. `None` when no snapshot is outstanding.
    pending_hints: Option<Vec<NetworkHint>>,
    resolver: Arc<dyn PlayerResolver>,
    storage: Arc<dyn DataStorage>,
    command_rx: mpsc::Receiver<Command>,
    hint_tx: mpsc::UnboundedSender<HintMessage>,
    hint_rx: mpsc::UnboundedReceiver<HintMessage>,
    events: EventBus,
}

impl SessionWorker {
    /// Creates a new session worker.
    pub fn new(
        resolver: Arc<dyn PlayerResolver>,
        storage: Arc<dyn DataStorage>,
        command_rx: mpsc::Receiver<Command>,
        events: EventBus,
    ) -> Self {
        let (hint_tx, hint_rx) = mpsc::unbounded_channel();
        let ledger = SessionLedger::new();
        Self {
            current: Arc::new(AtomicU64::new(ledger.generation().0)),
            pending_hints: None,
            ledger,
            resolver,
            storage,
            command_rx,
            hint_tx,
            hint_rx,
            events,
        }
    }

    /// Main worker loop. Ends when every handle has been dropped.
    ///
    /// Storage messages already queued are applied before the next command,
    /// so a notification delivered before a query is visible to that query.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                Some(message) = self.hint_rx.recv() => {
                    self.handle_hint_message(message);
                }
                command = self.command_rx.recv() => match command {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
            }
        }

        debug!(target: "runtime::worker", "Session worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::ReceivedItems { packet, reply } => {
                let result = self.received_items(packet);
                let _ = reply.send(result);
            }
            Command::Connected { reply } => {
                let result = self.connected();
                let _ = reply.send(result);
            }
            Command::QueryReceived { reply } => {
                let _ = reply.send(self.ledger.received().snapshot());
            }
            Command::QueryReceivedItem { index, reply } => {
                let result = self
                    .ledger
                    .received()
                    .get(index)
                    .cloned()
                    .ok_or(RuntimeError::ItemNotReceived { index });
                let _ = reply.send(result);
            }
            Command::QueryHints { reply } => {
                let _ = reply.send(self.ledger.hints().records().to_vec());
            }
            Command::QueryStatus { reply } => {
                let _ = reply.send(self.status());
            }
            Command::PrepareHintUpdate {
                player,
                location,
                status,
                reply,
            } => {
                let result = self.prepare_hint_update(player, location, status);
                let _ = reply.send(result);
            }
        }
    }

    fn handle_hint_message(&mut self, message: HintMessage) {
        match message {
            HintMessage::Snapshot {
                generation,
                key,
                result,
                reply,
            } => {
                let outcome = self.apply_snapshot(generation, &key, result);
                match reply.send(outcome) {
                    Ok(()) | Err(Err(RuntimeError::Superseded { .. })) => {}
                    Err(Err(error)) => error!(
                        target: "runtime::worker",
                        generation = %generation,
                        error = %error,
                        "Hint snapshot failed and no host is waiting on it"
                    ),
                    Err(Ok(())) => {}
                }
            }
            HintMessage::Changed {
                generation,
                key,
                value,
            } => self.apply_change(generation, &key, value),
        }
    }

    fn received_items(&mut self, packet: ReceivedItemsPacket) -> Result<()> {
        let ReceivedItemsPacket { index, items } = packet;
        let count = items.len();

        let resolved = match resolve_items(self.resolver.as_ref(), items) {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(
                    target: "runtime::worker",
                    index,
                    count,
                    error = %error,
                    "Item batch rejected"
                );
                return Err(error);
            }
        };

        let written = match self.ledger.received_mut().write(index, resolved) {
            Ok(written) => written,
            Err(error) => {
                warn!(
                    target: "runtime::worker",
                    index,
                    count,
                    error = %error,
                    "Item batch rejected"
                );
                return Err(error);
            }
        };

        debug!(
            target: "runtime::worker",
            generation = %self.ledger.generation(),
            index,
            count,
            log_len = self.ledger.received().len(),
            "Items received"
        );

        self.events.publish(ItemEvent::Received {
            items: written,
            index,
        });
        Ok(())
    }

    /// Resets the ledger for a new connection and retires every callback
    /// registered under the previous generation.
    fn begin_generation(&mut self) -> Generation {
        let generation = self.ledger.reset();
        self.current.store(generation.0, Ordering::Release);
        self.pending_hints = None;
        generation
    }

    fn connected(&mut self) -> Result<HintSubscription> {
        let generation = self.begin_generation();
        self.events.publish(SessionEvent::Connected { generation });

        let me = self.resolver.self_player().ok_or(RuntimeError::UnknownSelf)?;
        let key = read_hints_key(me.team, me.slot);
        self.pending_hints = Some(Vec::new());

        let (reply_tx, reply_rx) = oneshot::channel();
        let on_change = self.change_callback(generation);
        let storage = Arc::clone(&self.storage);
        let hint_tx = self.hint_tx.clone();
        let request_key = key.clone();

        tokio::spawn(async move {
            let result = storage.notify(vec![request_key.clone()], on_change).await;
            // The worker owns a sender, so the receiver outlives this task.
            let _ = hint_tx.send(HintMessage::Snapshot {
                generation,
                key: request_key,
                result,
                reply: reply_tx,
            });
        });

        info!(
            target: "runtime::worker",
            generation = %generation,
            key = %key,
            "Connected; subscribed to hints"
        );

        Ok(HintSubscription::new(generation, key, reply_rx))
    }

    fn change_callback(&self, generation: Generation) -> DataChangeCallback {
        let hint_tx = self.hint_tx.clone();
        let current = Arc::clone(&self.current);
        Arc::new(move |key: &str, value: &Value| {
            if current.load(Ordering::Acquire) != generation.0 {
                return;
            }
            let _ = hint_tx.send(HintMessage::Changed {
                generation,
                key: key.to_string(),
                value: value.clone(),
            });
        })
    }

    fn apply_snapshot(
        &mut self,
        generation: Generation,
        key: &str,
        result: std::result::Result<DataSnapshot, StorageError>,
    ) -> Result<()> {
        if !self.ledger.is_current(generation) {
            debug!(
                target: "runtime::worker",
                stale = %generation,
                current = %self.ledger.generation(),
                "Discarding hint snapshot from superseded connection"
            );
            return Err(RuntimeError::Superseded { generation });
        }

        // Changes queued behind a snapshot that never lands are dropped.
        let pending = self.pending_hints.take().unwrap_or_default();

        let mut snapshot = result.map_err(|error| {
            warn!(
                target: "runtime::worker",
                generation = %generation,
                error = %error,
                "Hint snapshot request failed"
            );
            RuntimeError::HintSnapshot(error)
        })?;

        let hints = decode_hints(snapshot.remove(key).unwrap_or(Value::Null))
            .map_err(RuntimeError::MalformedHints)?;
        let records = self.ledger.hints_mut().initialize(hints);

        debug!(
            target: "runtime::worker",
            generation = %generation,
            hints = records.len(),
            "Hints initialized"
        );

        self.events.publish(HintEvent::Initialized { hints: records });

        if !pending.is_empty() {
            debug!(
                target: "runtime::worker",
                generation = %generation,
                hints = pending.len(),
                "Applying hint changes that raced the snapshot"
            );
            self.publish_changes(pending);
        }
        Ok(())
    }

    fn apply_change(&mut self, generation: Generation, key: &str, value: Value) {
        if !self.ledger.is_current(generation) {
            trace!(
                target: "runtime::worker",
                stale = %generation,
                key,
                "Ignoring hint notification from superseded connection"
            );
            return;
        }

        let hints = match decode_hints(value) {
            Ok(hints) => hints,
            Err(error) => {
                warn!(
                    target: "runtime::worker",
                    key,
                    error = %error,
                    "Dropping undecodable hint notification"
                );
                return;
            }
        };

        if let Some(pending) = self.pending_hints.as_mut() {
            trace!(
                target: "runtime::worker",
                key,
                hints = hints.len(),
                "Holding hint notification until the snapshot lands"
            );
            pending.extend(hints);
            return;
        }

        trace!(target: "runtime::worker", key, "Hint notification received");
        self.publish_changes(hints);
    }

    fn publish_changes(&mut self, hints: Vec<NetworkHint>) {
        for change in self.ledger.hints_mut().apply(hints) {
            self.events.publish(HintEvent::from(change));
        }
    }

    fn prepare_hint_update(
        &self,
        player: SlotId,
        location: LocationId,
        status: HintStatus,
    ) -> Result<UpdateHintPacket> {
        let me = self.resolver.self_player().ok_or(RuntimeError::UnknownSelf)?;
        Ok(self
            .ledger
            .prepare_hint_update(me.slot, player, location, status)?)
    }

    fn status(&self) -> SessionStatus {
        let received = self.ledger.received();
        let hints = self.ledger.hints();
        SessionStatus {
            generation: self.ledger.generation(),
            item_count: received.len(),
            items_delivered: received.delivered(),
            hint_count: hints.len(),
            hints_initialized: hints.is_initialized(),
        }
    }
}

/// A key the store has no value for decodes as an empty list.
fn decode_hints(value: Value) -> serde_json::Result<Vec<NetworkHint>> {
    match value {
        Value::Null => Ok(Vec::new()),
        value => serde_json::from_value(value),
    }
}
