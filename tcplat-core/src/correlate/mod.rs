//! Cross-capture packet correlation.
//!
//! The [`Correlator`] joins two streams of keyed observations, one per
//! capture point. Matching is a FIFO multiset join: each occurrence of a
//! key in one capture pairs with the oldest still-unmatched occurrence of
//! the same key in the other. Repeated identical packets (retransmissions,
//! keep-alives) therefore pair up in order instead of all pairing with the
//! first sighting.
//!
//! Pairing assumes packets with the same key are not reordered between the
//! two capture points.
//!
//! ```
//! use tcplat_core::correlate::{Correlator, Origin, TaggedTimestamp};
//! # use tcplat_core::CaptureTimestamp;
//! # fn run(key: tcplat_core::TcpFlowKey) {
//! let mut correlator = Correlator::new();
//! let first = TaggedTimestamp::new(key, CaptureTimestamp::new(100, 10), Origin::First, 1);
//! let second = TaggedTimestamp::new(key, CaptureTimestamp::new(100, 30), Origin::Second, 1);
//!
//! assert!(correlator.observe(first).is_none());
//! let pair = correlator.observe(second).unwrap();
//! assert_eq!(pair.latency().as_micros(), 20);
//! # }
//! ```

mod pending;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use crate::protocol::TcpFlowKey;
use crate::timestamp::{CaptureTimestamp, Latency};

use pending::{PendingEntry, PendingQueue};

/// Which of the two captures an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Origin {
    /// Upstream (ingress) capture point
    First,
    /// Downstream (egress) capture point
    Second,
}

impl Origin {
    pub fn opposite(self) -> Self {
        match self {
            Origin::First => Origin::Second,
            Origin::Second => Origin::First,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Origin::First => "first",
            Origin::Second => "second",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When and where in its capture a packet was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub timestamp: CaptureTimestamp,
    pub frame_number: u64,
}

/// A keyed packet observation from one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedTimestamp {
    pub key: TcpFlowKey,
    pub timestamp: CaptureTimestamp,
    pub origin: Origin,
    pub frame_number: u64,
}

impl TaggedTimestamp {
    pub fn new(
        key: TcpFlowKey,
        timestamp: CaptureTimestamp,
        origin: Origin,
        frame_number: u64,
    ) -> Self {
        Self {
            key,
            timestamp,
            origin,
            frame_number,
        }
    }

    pub fn observation(&self) -> Observation {
        Observation {
            timestamp: self.timestamp,
            frame_number: self.frame_number,
        }
    }
}

/// The same packet seen at both capture points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair {
    pub key: TcpFlowKey,
    pub first: Observation,
    pub second: Observation,
}

impl MatchedPair {
    /// Second timestamp minus first; negative when the clocks disagree.
    pub fn latency(&self) -> Latency {
        Latency::between(self.first.timestamp, self.second.timestamp)
    }
}

/// A packet still without a counterpart when both streams have ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmatchedPacket {
    pub key: TcpFlowKey,
    pub origin: Origin,
    pub timestamp: CaptureTimestamp,
    pub frame_number: u64,
}

/// Counters maintained while correlating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrelatorStats {
    pub first_observed: u64,
    pub second_observed: u64,
    pub matched: u64,
    /// Largest number of distinct keys pending at once.
    pub peak_pending_keys: usize,
}

impl CorrelatorStats {
    pub fn observed(&self, origin: Origin) -> u64 {
        match origin {
            Origin::First => self.first_observed,
            Origin::Second => self.second_observed,
        }
    }
}

/// FIFO multiset join of two keyed observation streams.
#[derive(Debug, Default)]
pub struct Correlator {
    pending: HashMap<TcpFlowKey, PendingQueue>,
    pending_packets: usize,
    next_arrival: u64,
    stats: CorrelatorStats,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observation; returns the pair it completes, if any.
    pub fn observe(&mut self, tagged: TaggedTimestamp) -> Option<MatchedPair> {
        let observation = tagged.observation();
        let arrival = self.next_arrival;
        self.next_arrival += 1;
        match tagged.origin {
            Origin::First => self.stats.first_observed += 1,
            Origin::Second => self.stats.second_observed += 1,
        }

        let counterpart = match self.pending.entry(tagged.key) {
            Entry::Occupied(mut slot) if slot.get().origin() != tagged.origin => {
                let oldest = slot.get_mut().pop();
                if slot.get().is_empty() {
                    slot.remove();
                }
                oldest
            }
            Entry::Occupied(mut slot) => {
                slot.get_mut().push(PendingEntry {
                    arrival,
                    observation,
                });
                None
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingQueue::new(
                    tagged.origin,
                    PendingEntry {
                        arrival,
                        observation,
                    },
                ));
                None
            }
        };

        match counterpart {
            Some(entry) => {
                self.pending_packets -= 1;
                self.stats.matched += 1;
                let (first, second) = match tagged.origin {
                    Origin::Second => (entry.observation, observation),
                    Origin::First => (observation, entry.observation),
                };
                Some(MatchedPair {
                    key: tagged.key,
                    first,
                    second,
                })
            }
            None => {
                self.pending_packets += 1;
                self.stats.peak_pending_keys = self.stats.peak_pending_keys.max(self.pending.len());
                None
            }
        }
    }

    /// Distinct keys with unmatched occurrences.
    pub fn pending_keys(&self) -> usize {
        self.pending.len()
    }

    /// Unmatched occurrences across all keys.
    pub fn pending_packets(&self) -> usize {
        self.pending_packets
    }

    /// Number of unmatched occurrences of `key`, and which capture they came from.
    pub fn pending_for(&self, key: &TcpFlowKey) -> Option<(Origin, usize)> {
        self.pending.get(key).map(|queue| (queue.origin(), queue.len()))
    }

    pub fn stats(&self) -> CorrelatorStats {
        self.stats
    }

    /// Finish correlating; everything still pending is unmatched.
    ///
    /// Returned in the order the packets were observed.
    pub fn into_unmatched(self) -> Vec<UnmatchedPacket> {
        let mut drained: Vec<(u64, UnmatchedPacket)> = Vec::with_capacity(self.pending_packets);
        for (key, queue) in self.pending {
            let origin = queue.origin();
            drained.extend(queue.into_entries().map(|entry| {
                (
                    entry.arrival,
                    UnmatchedPacket {
                        key,
                        origin,
                        timestamp: entry.observation.timestamp,
                        frame_number: entry.observation.frame_number,
                    },
                )
            }));
        }
        drained.sort_unstable_by_key(|(arrival, _)| *arrival);
        drained.into_iter().map(|(_, packet)| packet).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn key(seq: u32) -> TcpFlowKey {
        TcpFlowKey::new(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            40000,
            80,
            seq,
            0,
        )
    }

    fn at(key: TcpFlowKey, origin: Origin, micros: u32, frame: u64) -> TaggedTimestamp {
        TaggedTimestamp::new(key, CaptureTimestamp::new(100, micros), origin, frame)
    }

    #[test]
    fn test_single_match() {
        let mut correlator = Correlator::new();
        assert!(correlator.observe(at(key(1), Origin::First, 10, 1)).is_none());

        let pair = correlator.observe(at(key(1), Origin::Second, 30, 1)).unwrap();
        assert_eq!(pair.latency().as_micros(), 20);
        assert_eq!(pair.first.frame_number, 1);
        assert_eq!(pair.second.frame_number, 1);
        assert_eq!(correlator.pending_keys(), 0);
    }

    #[test]
    fn test_duplicates_pair_in_fifo_order() {
        let mut correlator = Correlator::new();
        correlator.observe(at(key(1), Origin::First, 10, 1));
        correlator.observe(at(key(1), Origin::First, 12, 2));
        assert_eq!(correlator.pending_for(&key(1)), Some((Origin::First, 2)));

        let a = correlator.observe(at(key(1), Origin::Second, 30, 1)).unwrap();
        let b = correlator.observe(at(key(1), Origin::Second, 35, 2)).unwrap();

        assert_eq!(a.latency().as_micros(), 20);
        assert_eq!(b.latency().as_micros(), 23);
        assert_eq!(a.first.frame_number, 1);
        assert_eq!(b.first.frame_number, 2);
    }

    #[test]
    fn test_second_capture_seen_first() {
        let mut correlator = Correlator::new();
        assert!(correlator.observe(at(key(1), Origin::Second, 30, 7)).is_none());

        let pair = correlator.observe(at(key(1), Origin::First, 10, 3)).unwrap();
        assert_eq!(pair.first.frame_number, 3);
        assert_eq!(pair.second.frame_number, 7);
        assert_eq!(pair.latency().as_micros(), 20);
    }

    #[test]
    fn test_extra_occurrence_is_unmatched() {
        let mut correlator = Correlator::new();
        correlator.observe(at(key(1), Origin::First, 10, 1));
        correlator.observe(at(key(1), Origin::First, 12, 2));
        correlator.observe(at(key(1), Origin::Second, 30, 1));

        let unmatched = correlator.into_unmatched();
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].origin, Origin::First);
        assert_eq!(unmatched[0].frame_number, 2);
        assert_eq!(unmatched[0].timestamp, CaptureTimestamp::new(100, 12));
    }

    #[test]
    fn test_unmatched_drain_in_arrival_order() {
        let mut correlator = Correlator::new();
        for (i, seq) in [5u32, 3, 9, 1, 7].into_iter().enumerate() {
            correlator.observe(at(key(seq), Origin::First, i as u32, i as u64 + 1));
        }
        correlator.observe(at(key(42), Origin::Second, 50, 1));

        let frames: Vec<_> = correlator
            .into_unmatched()
            .iter()
            .map(|p| (p.origin, p.frame_number))
            .collect();
        assert_eq!(
            frames,
            vec![
                (Origin::First, 1),
                (Origin::First, 2),
                (Origin::First, 3),
                (Origin::First, 4),
                (Origin::First, 5),
                (Origin::Second, 1),
            ]
        );
    }

    #[test]
    fn test_matched_keys_are_pruned() {
        let mut correlator = Correlator::new();
        for seq in 0..100 {
            correlator.observe(at(key(seq), Origin::First, seq, seq as u64));
            correlator.observe(at(key(seq), Origin::Second, seq + 5, seq as u64));
        }

        assert_eq!(correlator.pending_keys(), 0);
        assert_eq!(correlator.pending_packets(), 0);

        let stats = correlator.stats();
        assert_eq!(stats.matched, 100);
        assert_eq!(stats.observed(Origin::First), 100);
        assert_eq!(stats.observed(Origin::Second), 100);
        assert_eq!(stats.peak_pending_keys, 1);
        assert!(correlator.into_unmatched().is_empty());
    }

    #[test]
    fn test_distinct_keys_do_not_match() {
        let mut correlator = Correlator::new();
        correlator.observe(at(key(1), Origin::First, 10, 1));
        assert!(correlator.observe(at(key(2), Origin::Second, 30, 1)).is_none());
        assert_eq!(correlator.pending_keys(), 2);
        assert_eq!(correlator.pending_packets(), 2);
    }

    #[test]
    fn test_origin_helpers() {
        assert_eq!(Origin::First.opposite(), Origin::Second);
        assert_eq!(Origin::Second.opposite(), Origin::First);
        assert_eq!(Origin::Second.to_string(), "second");
    }
}
