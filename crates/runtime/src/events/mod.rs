//! Topic-based event bus for session events.
//!
//! The worker publishes item, hint and session events to specific topics, and
//! consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{HintEvent, ItemEvent, SessionEvent};
