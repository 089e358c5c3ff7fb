//! Event types for different topics.

use multiworld_core::{HintRecord, ReceivedItem};
use serde::{Deserialize, Serialize};

use crate::ledger::Generation;

/// Events produced by the item stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ItemEvent {
    /// A batch was written. `items` is exactly the slice
    /// `[index, index + items.len())` of the received log after the write.
    Received {
        items: Vec<ReceivedItem>,
        index: usize,
    },
}

/// Events produced by the hint synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HintEvent {
    /// The snapshot for the current connection was applied. Carries every
    /// known hint in arrival order.
    Initialized { hints: Vec<HintRecord> },

    /// A hint not seen before in this connection.
    Received { hint: HintRecord },

    /// A known hint changed status. Fires for any non-identical transition,
    /// not only the transition to found.
    Found { hint: HintRecord },
}

/// Connection lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Local state was reset for a new connection.
    Connected { generation: Generation },
}
