//! Capture timestamps and the latencies derived from them.

use std::cmp::Ordering;
use std::fmt;

const MICROS_PER_SEC: i64 = 1_000_000;

/// A record timestamp as stored in a legacy capture: seconds plus microseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureTimestamp {
    /// Seconds since the epoch.
    pub secs: u32,
    /// Microseconds within the second.
    pub micros: u32,
}

impl CaptureTimestamp {
    pub fn new(secs: u32, micros: u32) -> Self {
        Self { secs, micros }
    }

    /// Total microseconds since the epoch.
    #[inline]
    pub fn as_micros(&self) -> i64 {
        self.secs as i64 * MICROS_PER_SEC + self.micros as i64
    }
}

impl PartialEq for CaptureTimestamp {
    fn eq(&self, other: &Self) -> bool {
        self.as_micros() == other.as_micros()
    }
}

impl Eq for CaptureTimestamp {}

impl Ord for CaptureTimestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        // Writers occasionally store micros >= 1_000_000, so compare the total.
        self.as_micros().cmp(&other.as_micros())
    }
}

impl PartialOrd for CaptureTimestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_micros(f, self.as_micros())
    }
}

/// One-way latency between two observations of the same packet.
///
/// Signed: a negative value means the second capture saw the packet first,
/// which points at clock skew or swapped inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Latency(i64);

impl Latency {
    /// `second - first`, with microsecond precision and no clamping.
    pub fn between(first: CaptureTimestamp, second: CaptureTimestamp) -> Self {
        Latency(second.as_micros() - first.as_micros())
    }

    pub fn from_micros(micros: i64) -> Self {
        Latency(micros)
    }

    #[inline]
    pub fn as_micros(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_micros(f, self.0)
    }
}

/// Render microseconds as `[-]S.UUUUUU`.
fn write_micros(f: &mut fmt::Formatter<'_>, micros: i64) -> fmt::Result {
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    let per_sec = MICROS_PER_SEC as u64;
    write!(f, "{sign}{}.{:06}", abs / per_sec, abs % per_sec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_keeps_sign() {
        let first = CaptureTimestamp::new(100, 500);
        let second = CaptureTimestamp::new(100, 300);

        let latency = Latency::between(first, second);
        assert_eq!(latency.as_micros(), -200);
        assert!(latency.is_negative());
        assert_eq!(latency.to_string(), "-0.000200");
    }

    #[test]
    fn test_latency_across_second_boundary() {
        let first = CaptureTimestamp::new(99, 999_900);
        let second = CaptureTimestamp::new(100, 100);

        assert_eq!(Latency::between(first, second).as_micros(), 200);
        assert_eq!(Latency::between(second, first).to_string(), "-0.000200");
    }

    #[test]
    fn test_timestamp_display() {
        assert_eq!(CaptureTimestamp::new(100, 500).to_string(), "100.000500");
        assert_eq!(CaptureTimestamp::new(0, 0).to_string(), "0.000000");
        assert_eq!(Latency::from_micros(2_500_001).to_string(), "2.500001");
    }

    #[test]
    fn test_ordering_uses_total_micros() {
        let overflowing = CaptureTimestamp::new(10, 1_500_000);
        let later = CaptureTimestamp::new(11, 200_000);

        assert!(overflowing > later);
        assert!(CaptureTimestamp::new(1, 0) < CaptureTimestamp::new(1, 1));
    }
}
