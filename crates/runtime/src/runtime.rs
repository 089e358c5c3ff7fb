//! High-level session runtime.
//!
//! The runtime owns the session worker, wires up command/event channels, and
//! exposes a builder-based API for hosts to feed connection traffic in.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::api::{Result, RuntimeError, SessionHandle};
use crate::events::{Event, EventBus, Topic};
use crate::roster::PlayerResolver;
use crate::storage::DataStorage;
use crate::workers::{Command, SessionWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Capacity of each topic's broadcast channel.
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Lifecycle container for one client session.
///
/// Owns the worker task. [`SessionHandle`] provides a cloneable façade for
/// the transport and the game integration.
pub struct Runtime {
    handle: SessionHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker exits once every outstanding [`SessionHandle`] clone has
    /// been dropped, so hosts should release theirs first.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    resolver: Option<Arc<dyn PlayerResolver>>,
    storage: Option<Arc<dyn DataStorage>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            resolver: None,
            storage: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the roster used to resolve item senders (required)
    pub fn resolver(mut self, resolver: impl PlayerResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Set the key/value store hints are read from (required)
    pub fn storage(mut self, storage: impl DataStorage + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Like [`storage`](Self::storage) for a store the host keeps using.
    pub fn shared_storage(mut self, storage: Arc<dyn DataStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build the runtime and spawn its worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        let resolver = self.resolver.ok_or(RuntimeError::MissingResolver)?;
        let storage = self.storage.ok_or(RuntimeError::MissingStorage)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = SessionHandle::new(command_tx, event_bus.clone());

        let worker = SessionWorker::new(resolver, storage, command_rx, event_bus);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        tracing::debug!(
            target: "runtime::worker",
            command_buffer = self.config.command_buffer_size,
            event_buffer = self.config.event_buffer_size,
            "Session runtime started"
        );

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
