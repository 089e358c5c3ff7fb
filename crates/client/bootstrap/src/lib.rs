//! Shared bootstrap utilities for multiworld client hosts.
//!
//! Provides configuration loading, logging setup, runtime assembly, and
//! session-script replay that can be reused by the binary or other hosts.
pub mod builder;
pub mod config;
pub mod logging;
pub mod replay;
pub mod script;

pub use builder::{SessionBuilder, SessionSetup};
pub use config::ClientConfig;
pub use replay::{ReplaySummary, replay};
pub use script::{SessionScript, Step};
