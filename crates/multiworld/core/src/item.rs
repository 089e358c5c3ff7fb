//! Item grants as sent by the server and as resolved for the local player.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::player::{Player, SlotId};

/// Game-specific item identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game-specific location identifier. Negative ids are server-side pseudo
/// locations (cheats, starting inventory).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub i64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Classification bits attached to an item on the wire.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ItemFlags: u8 {
        const PROGRESSION = 1 << 0;
        const USEFUL      = 1 << 1;
        const TRAP        = 1 << 2;
    }
}

impl ItemFlags {
    /// Items without any classification bit are filler.
    pub fn is_filler(self) -> bool {
        self.is_empty()
    }
}

// Flags travel as a plain integer; unknown bits are kept so they survive a
// re-encode.
impl Serialize for ItemFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for ItemFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_bits_retain(u8::deserialize(deserializer)?))
    }
}

/// One item grant in wire form.
///
/// For received items `player` is the slot that *sent* the item (the owner of
/// the location it was found at).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkItem {
    pub item: ItemId,
    pub location: LocationId,
    pub player: SlotId,
    #[serde(default)]
    pub flags: ItemFlags,
}

/// An item grant resolved against the session roster.
///
/// Immutable once built; a later delivery for the same index replaces the
/// whole value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedItem {
    item: NetworkItem,
    sender: Player,
    receiver: Player,
}

impl ReceivedItem {
    pub fn new(item: NetworkItem, sender: Player, receiver: Player) -> Self {
        Self {
            item,
            sender,
            receiver,
        }
    }

    pub fn network_item(&self) -> &NetworkItem {
        &self.item
    }

    pub fn id(&self) -> ItemId {
        self.item.item
    }

    pub fn location(&self) -> LocationId {
        self.item.location
    }

    pub fn flags(&self) -> ItemFlags {
        self.item.flags
    }

    /// Player whose world contained the item.
    pub fn sender(&self) -> &Player {
        &self.sender
    }

    /// Player the item was granted to (always the local player).
    pub fn receiver(&self) -> &Player {
        &self.receiver
    }

    pub fn is_progression(&self) -> bool {
        self.item.flags.contains(ItemFlags::PROGRESSION)
    }

    pub fn is_trap(&self) -> bool {
        self.item.flags.contains(ItemFlags::TRAP)
    }
}
