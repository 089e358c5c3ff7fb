//! Item stream reconciliation through the public runtime API.

mod common;

use common::*;
use multiworld_core::{ReceivedItemsPacket, SlotId};
use multiworld_runtime::{Event, InMemoryDataStorage, ItemEvent, RuntimeError, Topic};

#[tokio::test]
async fn batch_lands_at_its_index_and_is_announced() {
    let runtime = start(InMemoryDataStorage::new()).await;
    let handle = runtime.handle();
    let mut items_rx = handle.subscribe(Topic::Items);

    let batch = vec![item(1, ALLY), item(2, ALLY), item(3, SlotId::SERVER)];
    handle
        .received_items(ReceivedItemsPacket::new(10, batch))
        .await
        .expect("batch accepted");

    let Event::Items(ItemEvent::Received { items, index }) = next_event(&mut items_rx).await
    else {
        panic!("expected an item event");
    };
    assert_eq!(index, 10);
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].sender().name, "Ally");
    assert_eq!(items[2].sender().name, "Server");
    assert!(items.iter().all(|item| item.receiver().slot == ME));

    let received = handle.received().await.unwrap();
    assert_eq!(received.len(), 13);
    assert!(received[..10].iter().all(Option::is_none));
    let stored: Vec<_> = received[10..].iter().flatten().cloned().collect();
    assert_eq!(stored, items);

    assert_eq!(handle.count().await.unwrap(), 13);
    assert_eq!(handle.status().await.unwrap().items_delivered, 3);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn gaps_are_not_readable_by_index() {
    let runtime = start(InMemoryDataStorage::new()).await;
    let handle = runtime.handle();

    handle
        .received_items(ReceivedItemsPacket::new(2, vec![item(7, ALLY)]))
        .await
        .unwrap();

    assert_eq!(handle.received_item(2).await.unwrap().id().0, 7);
    assert!(matches!(
        handle.received_item(0).await,
        Err(RuntimeError::ItemNotReceived { index: 0 })
    ));
    assert!(matches!(
        handle.received_item(3).await,
        Err(RuntimeError::ItemNotReceived { index: 3 })
    ));
}

#[tokio::test]
async fn later_batches_overwrite_overlapping_indices() {
    let runtime = start(InMemoryDataStorage::new()).await;
    let handle = runtime.handle();
    let mut items_rx = handle.subscribe(Topic::Items);

    handle
        .received_items(ReceivedItemsPacket::new(0, vec![item(1, ALLY), item(2, ALLY)]))
        .await
        .unwrap();
    handle
        .received_items(ReceivedItemsPacket::new(1, vec![item(3, ALLY)]))
        .await
        .unwrap();

    next_event(&mut items_rx).await;
    let Event::Items(ItemEvent::Received { items, index }) = next_event(&mut items_rx).await
    else {
        panic!("expected an item event");
    };
    assert_eq!(index, 1);
    assert_eq!(items.len(), 1);

    let ids: Vec<_> = handle
        .received()
        .await
        .unwrap()
        .into_iter()
        .map(|slot| slot.map(|item| item.id().0))
        .collect();
    assert_eq!(ids, vec![Some(1), Some(3)]);
}

#[tokio::test]
async fn redelivery_is_idempotent() {
    let runtime = start(InMemoryDataStorage::new()).await;
    let handle = runtime.handle();

    let packet = ReceivedItemsPacket::new(0, vec![item(1, ALLY), item(2, ALLY)]);
    handle.received_items(packet.clone()).await.unwrap();
    let first = handle.received().await.unwrap();
    handle.received_items(packet).await.unwrap();

    assert_eq!(handle.received().await.unwrap(), first);
}

#[tokio::test]
async fn unresolved_sender_leaves_log_untouched() {
    let runtime = start(InMemoryDataStorage::new()).await;
    let handle = runtime.handle();
    let mut items_rx = handle.subscribe(Topic::Items);

    handle
        .received_items(ReceivedItemsPacket::new(0, vec![item(1, ALLY)]))
        .await
        .unwrap();
    next_event(&mut items_rx).await;

    let err = handle
        .received_items(ReceivedItemsPacket::new(0, vec![item(5, ALLY), item(6, SlotId(9))]))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnresolvedPlayer { slot } if slot == SlotId(9)));

    assert_eq!(handle.received_item(0).await.unwrap().id().0, 1);
    assert_eq!(handle.count().await.unwrap(), 1);
    assert_no_event(&handle, &mut items_rx).await;
}

#[tokio::test]
async fn unaddressable_batch_is_rejected() {
    let runtime = start(InMemoryDataStorage::new()).await;
    let handle = runtime.handle();
    let mut items_rx = handle.subscribe(Topic::Items);

    handle
        .received_items(ReceivedItemsPacket::new(0, vec![item(1, ALLY)]))
        .await
        .unwrap();
    next_event(&mut items_rx).await;

    let err = handle
        .received_items(ReceivedItemsPacket::new(
            usize::MAX,
            vec![item(2, ALLY), item(3, ALLY)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ItemIndexOutOfRange { index: usize::MAX, count: 2 }
    ));

    assert_eq!(handle.count().await.unwrap(), 1);
    assert_eq!(handle.received_item(0).await.unwrap().id().0, 1);
    assert_no_event(&handle, &mut items_rx).await;
}

#[tokio::test]
async fn empty_batch_still_emits() {
    let runtime = start(InMemoryDataStorage::new()).await;
    let handle = runtime.handle();
    let mut items_rx = handle.subscribe(Topic::Items);

    handle
        .received_items(ReceivedItemsPacket::new(4, Vec::new()))
        .await
        .unwrap();

    let Event::Items(ItemEvent::Received { items, index }) = next_event(&mut items_rx).await
    else {
        panic!("expected an item event");
    };
    assert!(items.is_empty());
    assert_eq!(index, 4);
    assert_eq!(handle.count().await.unwrap(), 0);
}
