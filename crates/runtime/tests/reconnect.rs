//! Connection resets and superseded asynchronous results.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::*;
use multiworld_core::ReceivedItemsPacket;
use multiworld_runtime::{
    DataChangeCallback, DataSnapshot, DataStorage, Event, Generation, HintEvent,
    InMemoryDataStorage, RuntimeError, SessionEvent, StorageError, Topic,
};
use tokio::sync::{Notify, Semaphore};

/// Registers watchers immediately but holds every snapshot until the test
/// releases a permit.
#[derive(Clone)]
struct GatedStorage {
    inner: InMemoryDataStorage,
    gate: Arc<Semaphore>,
    registered: Arc<Notify>,
}

impl GatedStorage {
    fn new(inner: InMemoryDataStorage) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
            registered: Arc::new(Notify::new()),
        }
    }

    fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }
}

#[async_trait]
impl DataStorage for GatedStorage {
    async fn notify(
        &self,
        keys: Vec<String>,
        on_change: DataChangeCallback,
    ) -> Result<DataSnapshot, StorageError> {
        let snapshot = self.inner.notify(keys, on_change).await;
        self.registered.notify_one();
        self.gate
            .acquire()
            .await
            .map_err(|_| StorageError::Unavailable("gate closed".to_string()))?
            .forget();
        snapshot
    }
}

#[tokio::test]
async fn reconnect_clears_items_and_hints() {
    let storage = InMemoryDataStorage::new();
    storage
        .set(&hints_key(), hints_value(&[hint(5, false)]))
        .unwrap();
    let runtime = start(storage.clone()).await;
    let handle = runtime.handle();

    connect(&handle).await;
    handle
        .received_items(ReceivedItemsPacket::new(0, vec![item(1, ALLY)]))
        .await
        .unwrap();
    assert_eq!(handle.hints().await.unwrap().len(), 1);
    assert_eq!(handle.count().await.unwrap(), 1);

    // Reset is synchronous with the command; the snapshot arrives later.
    storage.set(&hints_key(), serde_json::Value::Null).unwrap();
    let subscription = handle.connected().await.unwrap();
    assert!(handle.received().await.unwrap().is_empty());
    assert_eq!(handle.count().await.unwrap(), 0);

    subscription.initialized().await.unwrap();
    assert!(handle.hints().await.unwrap().is_empty());
}

#[tokio::test]
async fn connection_is_announced_with_its_generation() {
    let runtime = start(InMemoryDataStorage::new()).await;
    let handle = runtime.handle();
    let mut session_rx = handle.subscribe(Topic::Session);

    let first = handle.connected().await.unwrap();
    assert_eq!(first.generation(), Generation::FIRST);
    assert_eq!(first.key(), hints_key());

    let Event::Session(SessionEvent::Connected { generation }) = next_event(&mut session_rx).await
    else {
        panic!("expected a connection event");
    };
    assert_eq!(generation, Generation::FIRST);

    let second = handle.connected().await.unwrap();
    assert_eq!(second.generation(), Generation(2));
    assert_eq!(handle.generation().await.unwrap(), Generation(2));
}

#[tokio::test]
async fn stale_snapshot_does_not_overwrite_new_connection() {
    let inner = InMemoryDataStorage::new();
    inner
        .set(&hints_key(), hints_value(&[hint(5, false)]))
        .unwrap();
    let storage = GatedStorage::new(inner.clone());
    let runtime = start(storage.clone()).await;
    let handle = runtime.handle();
    let mut hints_rx = handle.subscribe(Topic::Hints);

    let stale = handle.connected().await.unwrap();
    let current = handle.connected().await.unwrap();
    storage.release(2);

    let err = stale.initialized().await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Superseded { generation } if generation == Generation::FIRST
    ));
    current.initialized().await.unwrap();

    let Event::Hints(HintEvent::Initialized { hints }) = next_event(&mut hints_rx).await else {
        panic!("expected the initial snapshot");
    };
    assert_eq!(hints.len(), 1);
    assert_no_event(&handle, &mut hints_rx).await;

    // Both subscriptions are still registered with the store; only the
    // current one may apply changes.
    assert_eq!(inner.watcher_count(&hints_key()), 2);
    inner
        .set(&hints_key(), hints_value(&[hint(5, false), hint(6, false)]))
        .unwrap();

    let Event::Hints(HintEvent::Received { hint: received }) = next_event(&mut hints_rx).await
    else {
        panic!("expected a new hint");
    };
    assert_eq!(received.location().0, 6);
    assert_no_event(&handle, &mut hints_rx).await;
    assert_eq!(handle.hints().await.unwrap().len(), 2);
}

#[tokio::test]
async fn change_during_pending_snapshot_is_applied_after_it() {
    let inner = InMemoryDataStorage::new();
    inner
        .set(&hints_key(), hints_value(&[hint(5, false)]))
        .unwrap();
    let storage = GatedStorage::new(inner.clone());
    let runtime = start(storage.clone()).await;
    let handle = runtime.handle();
    let mut hints_rx = handle.subscribe(Topic::Hints);

    let subscription = handle.connected().await.unwrap();
    storage.registered.notified().await;

    // The store reports the hint found before the snapshot reaches the worker.
    inner
        .set(&hints_key(), hints_value(&[hint(5, true)]))
        .unwrap();
    assert_no_event(&handle, &mut hints_rx).await;
    assert!(!handle.hints_initialized().await.unwrap());

    storage.release(1);
    subscription.initialized().await.unwrap();

    let Event::Hints(HintEvent::Initialized { hints }) = next_event(&mut hints_rx).await else {
        panic!("expected the initial snapshot");
    };
    assert!(!hints[0].is_found());

    let Event::Hints(HintEvent::Found { hint: found }) = next_event(&mut hints_rx).await else {
        panic!("expected the early change to be applied");
    };
    assert_eq!(found.location().0, 5);
    assert!(found.is_found());

    let hints = handle.hints().await.unwrap();
    assert_eq!(hints.len(), 1);
    assert!(hints[0].is_found());
}

#[tokio::test]
async fn dropped_subscription_still_initializes() {
    let storage = InMemoryDataStorage::new();
    storage
        .set(&hints_key(), hints_value(&[hint(5, false)]))
        .unwrap();
    let runtime = start(storage).await;
    let handle = runtime.handle();
    let mut hints_rx = handle.subscribe(Topic::Hints);

    drop(handle.connected().await.unwrap());

    assert!(matches!(
        next_event(&mut hints_rx).await,
        Event::Hints(HintEvent::Initialized { .. })
    ));
    assert!(handle.hints_initialized().await.unwrap());
}

#[tokio::test]
async fn builder_requires_collaborators() {
    let err = multiworld_runtime::Runtime::builder()
        .storage(InMemoryDataStorage::new())
        .build()
        .await
        .err()
        .expect("missing resolver");
    assert!(matches!(err, RuntimeError::MissingResolver));

    let err = multiworld_runtime::Runtime::builder()
        .resolver(roster())
        .build()
        .await
        .err()
        .expect("missing storage");
    assert!(matches!(err, RuntimeError::MissingStorage));
}

#[tokio::test]
async fn shutdown_waits_for_worker() {
    let runtime = start(InMemoryDataStorage::new()).await;
    let handle = runtime.handle();
    drop(handle);

    runtime.shutdown().await.unwrap();
}
