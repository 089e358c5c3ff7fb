//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or ledger state.

pub mod errors;
pub mod handle;

pub use errors::{Result, RuntimeError, StorageError};
pub use handle::{HintSubscription, SessionHandle};
