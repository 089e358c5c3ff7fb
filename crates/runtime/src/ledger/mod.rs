//! Per-connection session state.
//!
//! A [`SessionLedger`] holds everything learned during one connection: the
//! received item log and the hint set. Every reconnection discards the ledger
//! and starts a fresh one with the next [`Generation`]; asynchronous work is
//! tagged with the generation it was issued under so results belonging to a
//! superseded connection can be recognized and dropped.

mod hints;
mod received;

pub use hints::{HintChange, HintLedger};
pub use received::ReceivedLog;

use std::fmt;

use multiworld_core::{HintStatus, HintUpdateError, LocationId, SlotId, UpdateHintPacket};
use serde::{Deserialize, Serialize};

/// Connection counter. `INITIAL` is the state before any connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    pub const INITIAL: Self = Self(0);
    pub const FIRST: Self = Self(1);

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct SessionLedger {
    generation: Generation,
    received: ReceivedLog,
    hints: HintLedger,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn for_generation(generation: Generation) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Replaces this ledger with an empty one for the next connection and
    /// returns its generation.
    pub fn reset(&mut self) -> Generation {
        let next = self.generation.next();
        *self = Self::for_generation(next);
        next
    }

    pub fn received(&self) -> &ReceivedLog {
        &self.received
    }

    pub fn received_mut(&mut self) -> &mut ReceivedLog {
        &mut self.received
    }

    pub fn hints(&self) -> &HintLedger {
        &self.hints
    }

    pub fn hints_mut(&mut self) -> &mut HintLedger {
        &mut self.hints
    }

    /// Validates a status change for the hint of `player`'s `location`
    /// received by `requester`.
    pub fn prepare_hint_update(
        &self,
        requester: SlotId,
        player: SlotId,
        location: LocationId,
        status: HintStatus,
    ) -> Result<UpdateHintPacket, HintUpdateError> {
        let mut candidates = self
            .hints
            .records()
            .iter()
            .filter(|record| record.finding_player() == player && record.location() == location);

        let record = candidates
            .clone()
            .find(|record| record.receiving_player() == requester)
            .or_else(|| candidates.next())
            .ok_or(HintUpdateError::UnknownHint { player, location })?;

        UpdateHintPacket::for_record(record, requester, status)
    }
}
