//! Hint records and their position-independent identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::{ItemFlags, ItemId, LocationId};
use crate::player::{SlotId, TeamId};

/// Storage key under which the server keeps the hints of `team`/`slot`.
pub fn read_hints_key(team: TeamId, slot: SlotId) -> String {
    format!("_read_hints_{}_{}", team, slot)
}

/// Priority or completion state of a hint.
///
/// Travels as an integer. `Found` is terminal: the server never moves a hint
/// out of it and clients may not request it.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(try_from = "u8", into = "u8")]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum HintStatus {
    #[default]
    Unspecified = 0,
    NoPriority = 10,
    Avoid = 20,
    Priority = 30,
    Found = 40,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown hint status {0}")]
pub struct UnknownHintStatus(pub u8);

impl TryFrom<u8> for HintStatus {
    type Error = UnknownHintStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unspecified),
            10 => Ok(Self::NoPriority),
            20 => Ok(Self::Avoid),
            30 => Ok(Self::Priority),
            40 => Ok(Self::Found),
            other => Err(UnknownHintStatus(other)),
        }
    }
}

impl From<HintStatus> for u8 {
    fn from(status: HintStatus) -> Self {
        status as u8
    }
}

/// A hint in wire form, as stored under the read-hints key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkHint {
    pub receiving_player: SlotId,
    pub finding_player: SlotId,
    pub location: LocationId,
    pub item: ItemId,
    pub found: bool,
    #[serde(default)]
    pub entrance: String,
    #[serde(default)]
    pub item_flags: ItemFlags,
    /// Older servers omit the status entirely.
    #[serde(default)]
    pub status: Option<HintStatus>,
}

impl NetworkHint {
    pub fn key(&self) -> HintKey {
        HintKey {
            finding_player: self.finding_player,
            receiving_player: self.receiving_player,
            item: self.item,
            location: self.location,
        }
    }

    /// Status with the found flag folded in for servers that omit `status`.
    pub fn effective_status(&self) -> HintStatus {
        match self.status {
            Some(status) => status,
            None if self.found => HintStatus::Found,
            None => HintStatus::Unspecified,
        }
    }
}

/// Identity of a hint: the same item at the same location hinted between the
/// same two players is the same hint, wherever it sits in the remote list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HintKey {
    pub finding_player: SlotId,
    pub receiving_player: SlotId,
    pub item: ItemId,
    pub location: LocationId,
}

impl fmt::Display for HintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.finding_player, self.receiving_player, self.item, self.location
        )
    }
}

/// Immutable local snapshot of one hint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintRecord {
    key: HintKey,
    hint: NetworkHint,
}

impl HintRecord {
    pub fn key(&self) -> HintKey {
        self.key
    }

    pub fn network_hint(&self) -> &NetworkHint {
        &self.hint
    }

    pub fn receiving_player(&self) -> SlotId {
        self.hint.receiving_player
    }

    pub fn finding_player(&self) -> SlotId {
        self.hint.finding_player
    }

    pub fn item(&self) -> ItemId {
        self.hint.item
    }

    pub fn location(&self) -> LocationId {
        self.hint.location
    }

    pub fn entrance(&self) -> &str {
        &self.hint.entrance
    }

    pub fn is_found(&self) -> bool {
        self.hint.found
    }

    /// Effective status. Hints from servers without status support report
    /// `Found` or `Unspecified` depending on the found flag.
    pub fn status(&self) -> HintStatus {
        self.hint.effective_status()
    }
}

impl From<NetworkHint> for HintRecord {
    fn from(hint: NetworkHint) -> Self {
        Self {
            key: hint.key(),
            hint,
        }
    }
}
