use std::collections::VecDeque;

use super::{Observation, Origin};

/// An unmatched occurrence awaiting its counterpart.
#[derive(Debug, Clone, Copy)]
pub(super) struct PendingEntry {
    /// Position in the combined arrival order of both streams.
    pub arrival: u64,
    pub observation: Observation,
}

/// Pending occurrences of one key, all from the same origin.
///
/// An arrival from the opposite origin always dequeues before anything is
/// enqueued, so a key never has pending entries from both sides.
#[derive(Debug)]
pub(super) struct PendingQueue {
    origin: Origin,
    entries: VecDeque<PendingEntry>,
}

impl PendingQueue {
    pub fn new(origin: Origin, first: PendingEntry) -> Self {
        let mut entries = VecDeque::with_capacity(1);
        entries.push_back(first);
        Self { origin, entries }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn push(&mut self, entry: PendingEntry) {
        self.entries.push_back(entry);
    }

    /// Oldest pending entry (FIFO).
    pub fn pop(&mut self) -> Option<PendingEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> impl Iterator<Item = PendingEntry> {
        self.entries.into_iter()
    }
}
