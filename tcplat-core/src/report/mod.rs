//! Latency reporting.
//!
//! Matched pairs become [`LatencySample`]s and, together with unmatched
//! packets, are streamed row by row to a [`ReportSink`]. The core never
//! buffers results; formatting and aggregation belong to the sink.

mod pipeline;
mod sink;

pub use pipeline::{CaptureStats, LatencyPipeline, PipelineConfig, ReadOrder, RunStats};
pub use sink::ReportSink;

use crate::correlate::{MatchedPair, Observation, Origin, UnmatchedPacket};
use crate::error::Result;
use crate::protocol::TcpFlowKey;
use crate::timestamp::Latency;

/// Latency of one packet between the two capture points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySample {
    pub key: TcpFlowKey,
    pub first: Observation,
    pub second: Observation,
    pub latency: Latency,
}

impl From<MatchedPair> for LatencySample {
    fn from(pair: MatchedPair) -> Self {
        Self {
            key: pair.key,
            first: pair.first,
            second: pair.second,
            latency: pair.latency(),
        }
    }
}

/// One output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRow {
    Matched(LatencySample),
    Unmatched(UnmatchedPacket),
}

impl ReportRow {
    pub fn key(&self) -> &TcpFlowKey {
        match self {
            ReportRow::Matched(sample) => &sample.key,
            ReportRow::Unmatched(packet) => &packet.key,
        }
    }

    pub fn latency(&self) -> Option<Latency> {
        match self {
            ReportRow::Matched(sample) => Some(sample.latency),
            ReportRow::Unmatched(_) => None,
        }
    }
}

/// Turns correlator output into rows on a sink, counting what it sends.
#[derive(Debug)]
pub struct LatencyReporter<S> {
    sink: S,
    matched: u64,
    unmatched_first: u64,
    unmatched_second: u64,
}

impl<S: ReportSink> LatencyReporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            matched: 0,
            unmatched_first: 0,
            unmatched_second: 0,
        }
    }

    pub fn report_match(&mut self, pair: MatchedPair) -> Result<()> {
        self.matched += 1;
        self.sink.emit(ReportRow::Matched(pair.into()))
    }

    pub fn report_unmatched(&mut self, packet: UnmatchedPacket) -> Result<()> {
        match packet.origin {
            Origin::First => self.unmatched_first += 1,
            Origin::Second => self.unmatched_second += 1,
        }
        self.sink.emit(ReportRow::Unmatched(packet))
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

    /// Flush the sink and hand it back.
    pub fn finish(mut self) -> Result<S> {
        self.sink.finish()?;
        Ok(self.sink)
    }
}
