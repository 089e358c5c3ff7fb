//! Key/value notification collaborator.
//!
//! The server keeps per-player data (such as the read-hints list) in a remote
//! key/value store. A client subscribes to keys and receives the current
//! values once, then a change callback every time a value is replaced. The
//! store's consistency protocol is the collaborator's concern; the runtime
//! only relies on snapshot + ordered change delivery.

mod memory;

pub use memory::InMemoryDataStorage;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Change callback: `(key, new_value)`. Called synchronously by the store, so
/// it must not block.
pub type DataChangeCallback = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Values of the subscribed keys at subscription time. Keys the store has no
/// value for may be absent or `null`.
pub type DataSnapshot = HashMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("data storage unavailable: {0}")]
    Unavailable(String),

    #[error("data storage rejected the request: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait DataStorage: Send + Sync {
    /// Registers `on_change` for every key in `keys` and resolves with their
    /// current values.
    async fn notify(
        &self,
        keys: Vec<String>,
        on_change: DataChangeCallback,
    ) -> Result<DataSnapshot, StorageError>;
}
