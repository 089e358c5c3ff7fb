//! In-memory DataStorage implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{DataChangeCallback, DataSnapshot, DataStorage, StorageError};

#[derive(Default)]
struct Inner {
    values: HashMap<String, Value>,
    watchers: HashMap<String, Vec<DataChangeCallback>>,
    pending_failure: Option<StorageError>,
}

/// Local key/value store with the same snapshot + change-callback contract as
/// the server store.
///
/// Clones share the same store. Watchers are never unregistered, matching a
/// server that keeps notifying every subscription made on a connection.
#[derive(Clone, Default)]
pub struct InMemoryDataStorage {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryDataStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the value of `key` and notifies its watchers in registration
    /// order.
    pub fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let watchers = {
            let mut inner = self.lock()?;
            inner.values.insert(key.to_string(), value.clone());
            inner.watchers.get(key).cloned().unwrap_or_default()
        };

        // Callbacks run without the lock held so they may call back into the
        // store.
        for watcher in watchers {
            watcher(key, &value);
        }

        tracing::trace!(target: "runtime::storage", key, "Value replaced");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().ok()?.values.get(key).cloned()
    }

    /// Makes the next `notify` call fail with `error`.
    pub fn fail_next_notify(&self, error: StorageError) -> Result<(), StorageError> {
        self.lock()?.pending_failure = Some(error);
        Ok(())
    }

    pub fn watcher_count(&self, key: &str) -> usize {
        self.lock()
            .map(|inner| inner.watchers.get(key).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock was poisoned".to_string()))
    }
}

#[async_trait]
impl DataStorage for InMemoryDataStorage {
    async fn notify(
        &self,
        keys: Vec<String>,
        on_change: DataChangeCallback,
    ) -> Result<DataSnapshot, StorageError> {
        let mut inner = self.lock()?;

        if let Some(error) = inner.pending_failure.take() {
            return Err(error);
        }

        let mut snapshot = DataSnapshot::with_capacity(keys.len());
        for key in keys {
            inner
                .watchers
                .entry(key.clone())
                .or_default()
                .push(Arc::clone(&on_change));
            let value = inner.values.get(&key).cloned().unwrap_or(Value::Null);
            snapshot.insert(key, value);
        }

        Ok(snapshot)
    }
}
