//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::time::Duration;

use multiworld_core::{
    HintStatus, ItemFlags, ItemId, LocationId, NetworkHint, NetworkItem, Player, SlotId, TeamId,
    read_hints_key,
};
use multiworld_runtime::{
    DataStorage, Event, InMemoryDataStorage, Runtime, SessionHandle, StaticRoster,
};
use serde_json::Value;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::timeout;

pub const TEAM: TeamId = TeamId(0);
pub const ME: SlotId = SlotId(1);
pub const ALLY: SlotId = SlotId(2);

pub fn roster() -> StaticRoster {
    StaticRoster::new(
        Player::new(TEAM, ME, "Me"),
        [Player::new(TEAM, ALLY, "Ally")],
    )
}

pub async fn start(storage: impl DataStorage + 'static) -> Runtime {
    Runtime::builder()
        .resolver(roster())
        .storage(storage)
        .build()
        .await
        .expect("runtime should build")
}

pub fn item(id: i64, from: SlotId) -> NetworkItem {
    NetworkItem {
        item: ItemId(id),
        location: LocationId(1000 + id),
        player: from,
        flags: ItemFlags::PROGRESSION,
    }
}

/// Hint for an item of ours sitting in the ally's world.
pub fn hint(location: i64, found: bool) -> NetworkHint {
    NetworkHint {
        receiving_player: ME,
        finding_player: ALLY,
        location: LocationId(location),
        item: ItemId(100 + location),
        found,
        entrance: String::new(),
        item_flags: ItemFlags::USEFUL,
        status: None,
    }
}

pub fn with_status(mut hint: NetworkHint, status: HintStatus) -> NetworkHint {
    hint.status = Some(status);
    hint
}

pub fn hints_key() -> String {
    read_hints_key(TEAM, ME)
}

pub fn hints_value(hints: &[NetworkHint]) -> Value {
    serde_json::to_value(hints).expect("hints serialize")
}

/// Connects and waits for the initial hint snapshot.
pub async fn connect(handle: &SessionHandle) {
    handle
        .connected()
        .await
        .expect("connected")
        .initialized()
        .await
        .expect("hints initialized");
}

pub async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Event {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Round-trips a query so every queued notification has been applied, then
/// checks nothing else was published.
pub async fn assert_no_event(handle: &SessionHandle, rx: &mut broadcast::Receiver<Event>) {
    handle.status().await.expect("status");
    match rx.try_recv() {
        Err(TryRecvError::Empty) => {}
        other => panic!("unexpected event: {other:?}"),
    }
}
