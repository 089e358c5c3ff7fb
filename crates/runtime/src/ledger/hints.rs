//! Keyed hint set with incremental diffing.
//!
//! `records` is the arena in arrival order; `positions` maps each hint key to
//! its slot so a notification is diffed in O(1) per hint. The set only grows
//! or replaces records in place, it never removes.

use std::collections::HashMap;

use multiworld_core::{HintKey, HintRecord, NetworkHint};
use tracing::debug;

use crate::events::HintEvent;

/// Outcome of applying one hint from a change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintChange {
    /// Unknown key; appended.
    Received(HintRecord),
    /// Known key whose status changed; replaced in place.
    Found(HintRecord),
}

impl From<HintChange> for HintEvent {
    fn from(change: HintChange) -> Self {
        match change {
            HintChange::Received(hint) => HintEvent::Received { hint },
            HintChange::Found(hint) => HintEvent::Found { hint },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Unchanged,
    Changed,
    /// A found hint reported as not found. Found is terminal, so this is
    /// ignored.
    Regressed,
}

fn classify(cached: &HintRecord, incoming: &NetworkHint) -> Transition {
    if cached.is_found() {
        return if incoming.found {
            Transition::Unchanged
        } else {
            Transition::Regressed
        };
    }

    if incoming.found || incoming.effective_status() != cached.status() {
        Transition::Changed
    } else {
        Transition::Unchanged
    }
}

#[derive(Debug, Clone, Default)]
pub struct HintLedger {
    records: Vec<HintRecord>,
    positions: HashMap<HintKey, usize>,
    initialized: bool,
}

impl HintLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole set with a snapshot and returns a copy of it.
    ///
    /// A key repeated within the snapshot keeps its first position and the
    /// content of its last occurrence.
    pub fn initialize(&mut self, hints: Vec<NetworkHint>) -> Vec<HintRecord> {
        self.records.clear();
        self.positions.clear();

        for hint in hints {
            let record = HintRecord::from(hint);
            match self.positions.get(&record.key()) {
                Some(&position) => self.records[position] = record,
                None => self.push(record),
            }
        }

        self.initialized = true;
        self.records.clone()
    }

    /// Diffs a change notification against the cached set, in order.
    pub fn apply(&mut self, hints: Vec<NetworkHint>) -> Vec<HintChange> {
        hints
            .into_iter()
            .filter_map(|hint| self.apply_one(hint))
            .collect()
    }

    fn apply_one(&mut self, hint: NetworkHint) -> Option<HintChange> {
        let Some(&position) = self.positions.get(&hint.key()) else {
            let record = HintRecord::from(hint);
            self.push(record.clone());
            return Some(HintChange::Received(record));
        };

        match classify(&self.records[position], &hint) {
            Transition::Unchanged => None,
            Transition::Regressed => {
                debug!(
                    target: "runtime::ledger",
                    key = %hint.key(),
                    "Ignoring found hint reported as not found"
                );
                None
            }
            Transition::Changed => {
                let record = HintRecord::from(hint);
                self.records[position] = record.clone();
                Some(HintChange::Found(record))
            }
        }
    }

    fn push(&mut self, record: HintRecord) {
        self.positions.insert(record.key(), self.records.len());
        self.records.push(record);
    }

    pub fn get(&self, key: &HintKey) -> Option<&HintRecord> {
        self.positions.get(key).map(|&position| &self.records[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &HintRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[HintRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the snapshot for this connection has been applied.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
