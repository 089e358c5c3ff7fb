//! Positional log of received items.
//!
//! The server assigns every grant a fixed index in the receiver's item order.
//! The log writes each grant at that index, overwriting whatever was there,
//! so redelivery of the same range is idempotent. Indices that were never
//! written are gaps and read back as `None`.

use multiworld_core::ReceivedItem;

use crate::api::{Result, RuntimeError};

#[derive(Debug, Clone, Default)]
pub struct ReceivedLog {
    slots: Vec<Option<ReceivedItem>>,
}

impl ReceivedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `items` at `index`, `index + 1`, ... and returns the written
    /// slice.
    ///
    /// A range the log cannot grow to fails with
    /// [`RuntimeError::ItemIndexOutOfRange`] and leaves the log untouched.
    pub fn write(&mut self, index: usize, items: Vec<ReceivedItem>) -> Result<Vec<ReceivedItem>> {
        if items.is_empty() {
            return Ok(items);
        }

        let count = items.len();
        let out_of_range = || RuntimeError::ItemIndexOutOfRange { index, count };
        let end = index.checked_add(count).ok_or_else(out_of_range)?;
        if self.slots.len() < end {
            self.slots
                .try_reserve(end - self.slots.len())
                .map_err(|_| out_of_range())?;
            self.slots.resize(end, None);
        }

        let written = items.clone();
        for (slot, item) in self.slots[index..end].iter_mut().zip(items) {
            *slot = Some(item);
        }
        Ok(written)
    }

    pub fn get(&self, index: usize) -> Option<&ReceivedItem> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Positional length: one past the highest written index.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of written slots.
    pub fn delivered(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Indices below `len()` that were never written.
    pub fn gaps(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.is_none().then_some(index))
    }

    /// Written items with their index, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ReceivedItem)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (index, item)))
    }

    /// Copy of the whole log, gaps included.
    pub fn snapshot(&self) -> Vec<Option<ReceivedItem>> {
        self.slots.clone()
    }
}
