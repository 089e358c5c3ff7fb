//! Player resolution for incoming item grants.
//!
//! The transport layer owns the session roster; the runtime only needs to map
//! a slot number to a [`Player`] and to know who the local player is. Hosts
//! plug their roster in through [`PlayerResolver`].

use std::collections::HashMap;

use multiworld_core::{NetworkItem, Player, ReceivedItem, SlotId};

use crate::api::{Result, RuntimeError};

/// Maps slot numbers of the local player's team to players.
pub trait PlayerResolver: Send + Sync {
    /// The player this client is connected as, once known.
    fn self_player(&self) -> Option<Player>;

    /// A player of the local team by slot.
    fn find_player(&self, slot: SlotId) -> Option<Player>;
}

/// Resolves a whole batch before anything is written, so a failing batch
/// leaves the log untouched.
pub(crate) fn resolve_items(
    resolver: &dyn PlayerResolver,
    items: Vec<NetworkItem>,
) -> Result<Vec<ReceivedItem>> {
    let receiver = resolver.self_player().ok_or(RuntimeError::UnknownSelf)?;

    items
        .into_iter()
        .map(|item| {
            let sender = resolver
                .find_player(item.player)
                .ok_or(RuntimeError::UnresolvedPlayer { slot: item.player })?;
            Ok(ReceivedItem::new(item, sender, receiver.clone()))
        })
        .collect()
}

/// Fixed roster known up front, used by the replay host and tests.
///
/// Slot 0 always resolves to the server pseudo-player of the local team.
#[derive(Debug, Clone)]
pub struct StaticRoster {
    me: Player,
    players: HashMap<SlotId, Player>,
}

impl StaticRoster {
    pub fn new(me: Player, others: impl IntoIterator<Item = Player>) -> Self {
        let server = Player::new(me.team, SlotId::SERVER, "Server");
        let players = std::iter::once(server)
            .chain(std::iter::once(me.clone()))
            .chain(others.into_iter().filter(|player| player.team == me.team))
            .map(|player| (player.slot, player))
            .collect();

        Self { me, players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl PlayerResolver for StaticRoster {
    fn self_player(&self) -> Option<Player> {
        Some(self.me.clone())
    }

    fn find_player(&self, slot: SlotId) -> Option<Player> {
        self.players.get(&slot).cloned()
    }
}
