//! End-of-run latency summary.

use std::io::{self, Write};

use tcplat_core::{Latency, Origin, ReportRow, RunStats};

/// Aggregates computed from the streamed rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencySummary {
    matched: u64,
    unmatched_first: u64,
    unmatched_second: u64,
    total_micros: i128,
    min: Option<Latency>,
    max: Option<Latency>,
}

impl LatencySummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, row: &ReportRow) {
        match row {
            ReportRow::Matched(sample) => {
                let latency = sample.latency;
                self.matched += 1;
                self.total_micros += i128::from(latency.as_micros());
                self.min = Some(self.min.map_or(latency, |m| m.min(latency)));
                self.max = Some(self.max.map_or(latency, |m| m.max(latency)));
            }
            ReportRow::Unmatched(packet) => match packet.origin {
                Origin::First => self.unmatched_first += 1,
                Origin::Second => self.unmatched_second += 1,
            },
        }
    }

    pub fn matched(&self) -> u64 {
        self.matched
    }

    pub fn unmatched(&self, origin: Origin) -> u64 {
        match origin {
            Origin::First => self.unmatched_first,
            Origin::Second => self.unmatched_second,
        }
    }

    /// Mean latency in microseconds.
    pub fn mean_micros(&self) -> Option<f64> {
        (self.matched > 0).then(|| self.total_micros as f64 / self.matched as f64)
    }

    pub fn min(&self) -> Option<Latency> {
        self.min
    }

    pub fn max(&self) -> Option<Latency> {
        self.max
    }

    /// Spread between the largest and smallest latency.
    pub fn jitter(&self) -> Option<Latency> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(Latency::from_micros(max.as_micros() - min.as_micros())),
            _ => None,
        }
    }

    /// Share of keyed first-capture packets never seen in the second.
    pub fn miss_percent(&self, first_keyed: u64) -> f64 {
        if first_keyed == 0 {
            return 0.0;
        }
        self.unmatched_first as f64 * 100.0 / first_keyed as f64
    }

    pub fn write<W: Write>(&self, writer: &mut W, stats: &RunStats) -> io::Result<()> {
        writeln!(
            writer,
            "packets: {} first, {} second; matched: {}; miss: {} first ({:.2}%), {} second",
            stats.first.keyed,
            stats.second.keyed,
            self.matched,
            self.unmatched_first,
            self.miss_percent(stats.first.keyed),
            self.unmatched_second,
        )?;

        match (self.mean_micros(), self.min, self.max, self.jitter()) {
            (Some(mean), Some(min), Some(max), Some(jitter)) => writeln!(
                writer,
                "latency (us): mean {mean:.2}, min {}, max {}, jitter {}",
                min.as_micros(),
                max.as_micros(),
                jitter.as_micros(),
            ),
            _ => writeln!(writer, "latency (us): no matched packets"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    use tcplat_core::{
        CaptureTimestamp, LatencySample, Observation, TcpFlowKey, UnmatchedPacket,
    };

    fn key() -> TcpFlowKey {
        TcpFlowKey::new(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            1234,
            80,
            1,
            0,
        )
    }

    fn matched(micros: i64) -> ReportRow {
        let observation = Observation {
            timestamp: CaptureTimestamp::new(1, 0),
            frame_number: 1,
        };
        ReportRow::Matched(LatencySample {
            key: key(),
            first: observation,
            second: observation,
            latency: Latency::from_micros(micros),
        })
    }

    fn unmatched(origin: Origin) -> ReportRow {
        ReportRow::Unmatched(UnmatchedPacket {
            key: key(),
            origin,
            timestamp: CaptureTimestamp::new(1, 0),
            frame_number: 1,
        })
    }

    #[test]
    fn test_aggregates() {
        let mut summary = LatencySummary::new();
        for row in [matched(20), matched(-5), matched(30), unmatched(Origin::First)] {
            summary.record(&row);
        }

        assert_eq!(summary.matched(), 3);
        assert_eq!(summary.unmatched(Origin::First), 1);
        assert_eq!(summary.mean_micros(), Some(15.0));
        assert_eq!(summary.min(), Some(Latency::from_micros(-5)));
        assert_eq!(summary.max(), Some(Latency::from_micros(30)));
        assert_eq!(summary.jitter(), Some(Latency::from_micros(35)));
        assert_eq!(summary.miss_percent(4), 25.0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = LatencySummary::new();
        assert_eq!(summary.mean_micros(), None);
        assert_eq!(summary.jitter(), None);
        assert_eq!(summary.miss_percent(0), 0.0);

        let mut out = Vec::new();
        summary.write(&mut out, &RunStats::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("matched: 0"));
        assert!(text.contains("no matched packets"));
    }

    #[test]
    fn test_write() {
        let mut summary = LatencySummary::new();
        summary.record(&matched(10));
        summary.record(&matched(20));
        summary.record(&unmatched(Origin::First));

        let mut stats = RunStats::default();
        stats.first.keyed = 3;
        stats.second.keyed = 2;

        let mut out = Vec::new();
        summary.write(&mut out, &stats).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("matched: 2"));
        assert!(text.contains("miss: 1 first (33.33%)"));
        assert!(text.contains("mean 15.00, min 10, max 20, jitter 10"));
    }
}
