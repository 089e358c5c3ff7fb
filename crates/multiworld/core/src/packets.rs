//! Packet payloads exchanged with the transport.
//!
//! Framing and the rest of the protocol belong to the transport; only the
//! payloads the reconciliation core consumes or produces live here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hint::{HintRecord, HintStatus};
use crate::item::{LocationId, NetworkItem};
use crate::player::SlotId;

/// Batch of item grants starting at `index` in the receiver's item order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedItemsPacket {
    pub index: usize,
    pub items: Vec<NetworkItem>,
}

impl ReceivedItemsPacket {
    pub fn new(index: usize, items: Vec<NetworkItem>) -> Self {
        Self { index, items }
    }

    /// One past the last index this batch writes.
    pub fn end(&self) -> usize {
        self.index + self.items.len()
    }
}

/// Client request to change the status of one of its own hints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename = "UpdateHint")]
pub struct UpdateHintPacket {
    /// Slot whose location is hinted (the finding player).
    pub player: SlotId,
    pub location: LocationId,
    pub status: HintStatus,
}

/// Reasons a hint status update is refused before it reaches the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintUpdateError {
    #[error("hint status cannot be set to found by a client")]
    CannotSetFound,

    #[error("no known hint for location {location} of player {player}")]
    UnknownHint { player: SlotId, location: LocationId },

    #[error("hint for location {location} is received by player {receiver}, not {requester}")]
    NotReceiver {
        location: LocationId,
        receiver: SlotId,
        requester: SlotId,
    },

    #[error("hint for location {location} of player {player} is already found")]
    AlreadyFound { player: SlotId, location: LocationId },
}

impl UpdateHintPacket {
    /// Build an update for `record` on behalf of `requester`.
    pub fn for_record(
        record: &HintRecord,
        requester: SlotId,
        status: HintStatus,
    ) -> Result<Self, HintUpdateError> {
        if status == HintStatus::Found {
            return Err(HintUpdateError::CannotSetFound);
        }
        if record.receiving_player() != requester {
            return Err(HintUpdateError::NotReceiver {
                location: record.location(),
                receiver: record.receiving_player(),
                requester,
            });
        }
        if record.is_found() {
            return Err(HintUpdateError::AlreadyFound {
                player: record.finding_player(),
                location: record.location(),
            });
        }

        Ok(Self {
            player: record.finding_player(),
            location: record.location(),
            status,
        })
    }
}
