//! Recorded session traffic that can be replayed against a runtime.
//!
//! A script stands in for a live server connection: it lists the roster and
//! the sequence of deliveries the transport would hand to the runtime.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use multiworld_core::{NetworkHint, NetworkItem, Player, SlotId, TeamId, read_hints_key};
use multiworld_runtime::StaticRoster;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScript {
    /// Team of the local player.
    pub team: TeamId,
    /// Slot of the local player.
    pub slot: SlotId,
    #[serde(default)]
    pub players: Vec<Player>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// New connection; waits for the hint snapshot.
    Connected,
    ReceivedItems {
        index: usize,
        items: Vec<NetworkItem>,
    },
    /// Replaces the local player's read-hints value in storage.
    SetHints { hints: Vec<NetworkHint> },
    /// Fails the replay unless the next expected item index equals `count`.
    ExpectCount { count: usize },
}

impl SessionScript {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read session script {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("invalid session script {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The local player, taken from `players` when listed there.
    pub fn me(&self) -> Player {
        self.players
            .iter()
            .find(|player| player.team == self.team && player.slot == self.slot)
            .cloned()
            .unwrap_or_else(|| Player::new(self.team, self.slot, format!("Player{}", self.slot)))
    }

    pub fn roster(&self) -> StaticRoster {
        StaticRoster::new(self.me(), self.players.iter().cloned())
    }

    pub fn hints_key(&self) -> String {
        read_hints_key(self.team, self.slot)
    }
}
