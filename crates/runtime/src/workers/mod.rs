//! Worker tasks that back the runtime orchestration.
//!
//! The session worker is the only owner of session state; everything else
//! talks to it through channels.

mod session;

pub use session::{Command, SessionStatus, SessionWorker};
