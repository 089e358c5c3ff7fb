//! Wire and domain types for a multiworld session client.
//!
//! `multiworld-core` defines the records exchanged with the server (items,
//! hints, hint status updates) and the resolved domain forms the runtime
//! keeps in its ledgers. Nothing here touches the network; the runtime crate
//! owns reconciliation and event delivery.
pub mod hint;
pub mod item;
pub mod packets;
pub mod player;

pub use hint::{
    HintKey, HintRecord, HintStatus, NetworkHint, UnknownHintStatus, read_hints_key,
};
pub use item::{ItemFlags, ItemId, LocationId, NetworkItem, ReceivedItem};
pub use packets::{HintUpdateError, ReceivedItemsPacket, UpdateHintPacket};
pub use player::{Player, SlotId, TeamId};
