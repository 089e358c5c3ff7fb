//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the session worker, the player roster, and the storage
//! collaborator so hosts can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use multiworld_core::{HintUpdateError, SlotId};

use crate::ledger::Generation;
pub use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("item sender slot {slot} is not in the session roster")]
    UnresolvedPlayer { slot: SlotId },

    #[error("local player is not known to the session roster")]
    UnknownSelf,

    #[error("item batch of {count} at index {index} exceeds the addressable log")]
    ItemIndexOutOfRange { index: usize, count: usize },

    #[error("no item has been received at index {index}")]
    ItemNotReceived { index: usize },

    #[error("hint snapshot request failed")]
    HintSnapshot(#[source] StorageError),

    #[error("hint payload could not be decoded")]
    MalformedHints(#[source] serde_json::Error),

    #[error("connection generation {generation} was superseded before hints initialized")]
    Superseded { generation: Generation },

    #[error(transparent)]
    HintUpdate(#[from] HintUpdateError),

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a player resolver before building")]
    MissingResolver,

    #[error("runtime requires a data storage before building")]
    MissingStorage,
}
