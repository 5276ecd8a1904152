//! Per-round message store and echo-broadcast completeness gate.
//!
//! One slot per party per round, written exactly once: identical re-delivery
//! is idempotent, a conflicting payload for a filled slot is rejected, and a
//! round may only finish once every party (self included) has a received
//! slot.

use crate::tss::error::ErrorKind;

#[derive(Clone, Debug)]
pub struct MessageStore {
    slots: Vec<Vec<u8>>,
    received: Vec<bool>,
}

impl MessageStore {
    pub fn new(party_count: usize) -> Self {
        MessageStore {
            slots: vec![Vec::new(); party_count],
            received: vec![false; party_count],
        }
    }

    pub fn party_count(&self) -> usize {
        self.slots.len()
    }

    /// Stores an accepted message for `from`. The caller has already decoded
    /// and validated the bytes; this enforces only slot semantics.
    pub fn store(&mut self, from: usize, bytes: &[u8]) -> Result<(), ErrorKind> {
        if from >= self.slots.len() {
            return Err(ErrorKind::InvalidPartyIndex(from));
        }
        if self.received[from] {
            if self.slots[from] == bytes {
                return Ok(());
            }
            return Err(ErrorKind::ConflictingMessage(from));
        }
        self.slots[from] = bytes.to_vec();
        self.received[from] = true;
        Ok(())
    }

    /// Records the local party's own message, produced during `exec` and
    /// treated as pre-accepted.
    pub fn store_own(&mut self, own_index: usize, bytes: &[u8]) -> Result<(), ErrorKind> {
        self.store(own_index, bytes)
    }

    pub fn get(&self, index: usize) -> Result<&[u8], ErrorKind> {
        if index >= self.slots.len() {
            return Err(ErrorKind::InvalidPartyIndex(index));
        }
        if !self.received[index] {
            return Err(ErrorKind::IncompleteRound(index));
        }
        Ok(&self.slots[index])
    }

    pub fn is_received(&self, index: usize) -> bool {
        self.received.get(index).copied().unwrap_or(false)
    }

    /// First party index with no received message, if any.
    pub fn first_missing(&self) -> Option<usize> {
        self.received.iter().position(|r| !r)
    }

    /// The echo-broadcast gate: every slot, self included, holds a received,
    /// non-empty message.
    pub fn finish(&self) -> Result<(), ErrorKind> {
        match self.first_missing() {
            Some(j) => Err(ErrorKind::IncompleteRound(j)),
            None => Ok(()),
        }
    }
}
