use std::fmt;

use serde::{Deserialize, Serialize};

/// Slot number of a player within its team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u32);

impl SlotId {
    /// Reserved slot used by the server itself (cheats, starting inventory).
    pub const SERVER: Self = Self(0);

    #[inline]
    pub const fn is_server(self) -> bool {
        self.0 == Self::SERVER.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team number; slots are only unique within a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A participant of the multiworld, as reported by the server roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub team: TeamId,
    pub slot: SlotId,
    pub name: String,
    /// Display name; falls back to `name` when the server sends none.
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub game: String,
}

impl Player {
    pub fn new(team: TeamId, slot: SlotId, name: impl Into<String>) -> Self {
        Self {
            team,
            slot,
            name: name.into(),
            alias: None,
            game: String::new(),
        }
    }

    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = game.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name to show to users.
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
