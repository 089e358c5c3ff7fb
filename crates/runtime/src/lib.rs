//! Client-side reconciliation runtime for a multiworld session.
//!
//! This crate keeps the local view of a connection consistent with what the
//! server delivers: the indexed stream of received items and the set of hints
//! read from the server's key/value store. Hosts embed [`Runtime`], feed it
//! connection traffic through [`SessionHandle`], and subscribe to events.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the lifecycle container and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`ledger`] holds per-connection state and its reconciliation rules
//! - [`roster`] and [`storage`] are the collaborator seams hosts plug into
//! - `workers` keeps the background task internal to the crate
pub mod api;
pub mod events;
pub mod ledger;
pub mod roster;
pub mod runtime;
pub mod storage;

mod workers;

pub use api::{HintSubscription, Result, RuntimeError, SessionHandle, StorageError};
pub use events::{Event, EventBus, HintEvent, ItemEvent, SessionEvent, Topic};
pub use ledger::{Generation, HintChange, HintLedger, ReceivedLog, SessionLedger};
pub use roster::{PlayerResolver, StaticRoster};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use storage::{DataChangeCallback, DataSnapshot, DataStorage, InMemoryDataStorage};
pub use workers::SessionStatus;
