//! End-to-end latency run over two captures.

use std::io::Read;

use tracing::{debug, info, trace, warn};

use super::{LatencyReporter, ReportSink};
use crate::correlate::{Correlator, Origin, TaggedTimestamp};
use crate::error::Result;
use crate::filter::ByteFilter;
use crate::pcap::CaptureReader;
use crate::protocol::{extract_key, LinkLayer};

/// Order in which records of the two captures are fed to the correlator.
///
/// Both orders produce the same matched pairs and unmatched packets; only
/// the order rows are emitted in and peak memory differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadOrder {
    /// Always advance the capture whose next packet is earlier (ties go to
    /// the first capture). Keeps pending state small on long captures.
    #[default]
    Merged,
    /// Read the first capture to the end, then the second.
    Sequential,
}

/// Configuration for [`LatencyPipeline`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Applied to raw frame bytes of both captures before key extraction.
    pub filter: ByteFilter,
    pub read_order: ReadOrder,
}

impl PipelineConfig {
    pub fn with_filter(mut self, filter: ByteFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_read_order(mut self, read_order: ReadOrder) -> Self {
        self.read_order = read_order;
        self
    }
}

/// Per-capture record counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Records read from the file.
    pub records: u64,
    /// Records rejected by the byte filter.
    pub filtered: u64,
    /// Records that were not IPv4/TCP.
    pub skipped: u64,
    /// Records that yielded a key and were correlated.
    pub keyed: u64,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub first: CaptureStats,
    pub second: CaptureStats,
    pub matched: u64,
    pub unmatched_first: u64,
    pub unmatched_second: u64,
    pub peak_pending_keys: usize,
}

impl RunStats {
    pub fn capture(&self, origin: Origin) -> &CaptureStats {
        match origin {
            Origin::First => &self.first,
            Origin::Second => &self.second,
        }
    }

    pub fn unmatched(&self, origin: Origin) -> u64 {
        match origin {
            Origin::First => self.unmatched_first,
            Origin::Second => self.unmatched_second,
        }
    }
}

/// One capture as a stream of keyed observations.
struct KeyedStream<'a, R: Read> {
    reader: CaptureReader<R>,
    origin: Origin,
    filter: &'a ByteFilter,
    keyable: bool,
    stats: CaptureStats,
}

impl<'a, R: Read> KeyedStream<'a, R> {
    fn new(reader: CaptureReader<R>, origin: Origin, filter: &'a ByteFilter) -> Self {
        let link_type = reader.link_type();
        let keyable = LinkLayer::from_link_type(link_type).is_some();
        if !keyable {
            warn!(%origin, link_type, "unsupported link type, no packets will be matched");
        }

        Self {
            reader,
            origin,
            filter,
            keyable,
            stats: CaptureStats::default(),
        }
    }

    /// Next packet that yields a key, or `None` at end of capture.
    fn next_tagged(&mut self) -> Result<Option<TaggedTimestamp>> {
        loop {
            let packet = match self.reader.next_packet() {
                Ok(Some(packet)) => packet,
                Ok(None) => return Ok(None),
                Err(e) => return Err(e.in_capture(self.origin)),
            };
            self.stats.records += 1;

            if !self.filter.matches(&packet.data) {
                self.stats.filtered += 1;
                trace!(origin = %self.origin, frame = packet.frame_number, "filtered");
                continue;
            }

            let key = if self.keyable {
                extract_key(&packet)
            } else {
                None
            };
            match key {
                Some(key) => {
                    self.stats.keyed += 1;
                    return Ok(Some(TaggedTimestamp::new(
                        key,
                        packet.timestamp,
                        self.origin,
                        packet.frame_number,
                    )));
                }
                None => {
                    self.stats.skipped += 1;
                    trace!(origin = %self.origin, frame = packet.frame_number, "not IPv4/TCP, skipped");
                }
            }
        }
    }
}

/// Reads two captures, correlates their packets and reports latencies.
#[derive(Debug, Clone, Default)]
pub struct LatencyPipeline {
    config: PipelineConfig,
}

impl LatencyPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run to completion, streaming rows to `sink`.
    ///
    /// Matched rows are emitted as soon as their second occurrence is read;
    /// unmatched rows follow once both captures are exhausted. A read error
    /// in either capture aborts the run without draining unmatched packets.
    pub fn run<A, B, S>(
        &self,
        first: CaptureReader<A>,
        second: CaptureReader<B>,
        sink: S,
    ) -> Result<RunStats>
    where
        A: Read,
        B: Read,
        S: ReportSink,
    {
        let mut first = KeyedStream::new(first, Origin::First, &self.config.filter);
        let mut second = KeyedStream::new(second, Origin::Second, &self.config.filter);
        let mut correlator = Correlator::new();
        let mut reporter = LatencyReporter::new(sink);

        debug!(read_order = ?self.config.read_order, "starting correlation");

        match self.config.read_order {
            ReadOrder::Merged => {
                let mut next_first = first.next_tagged()?;
                let mut next_second = second.next_tagged()?;
                loop {
                    let take_first = match (&next_first, &next_second) {
                        (Some(a), Some(b)) => a.timestamp <= b.timestamp,
                        (Some(_), None) => true,
                        (None, Some(_)) => false,
                        (None, None) => break,
                    };

                    let tagged = if take_first {
                        std::mem::replace(&mut next_first, first.next_tagged()?)
                    } else {
                        std::mem::replace(&mut next_second, second.next_tagged()?)
                    };
                    if let Some(pair) = tagged.and_then(|t| correlator.observe(t)) {
                        reporter.report_match(pair)?;
                    }
                }
            }
            ReadOrder::Sequential => {
                while let Some(tagged) = first.next_tagged()? {
                    if let Some(pair) = correlator.observe(tagged) {
                        reporter.report_match(pair)?;
                    }
                }
                while let Some(tagged) = second.next_tagged()? {
                    if let Some(pair) = correlator.observe(tagged) {
                        reporter.report_match(pair)?;
                    }
                }
            }
        }

        let peak_pending_keys = correlator.stats().peak_pending_keys;
        for packet in correlator.into_unmatched() {
            reporter.report_unmatched(packet)?;
        }

        let stats = RunStats {
            first: first.stats,
            second: second.stats,
            matched: reporter.matched(),
            unmatched_first: reporter.unmatched(Origin::First),
            unmatched_second: reporter.unmatched(Origin::Second),
            peak_pending_keys,
        };
        reporter.finish()?;

        info!(
            first_records = stats.first.records,
            second_records = stats.second.records,
            matched = stats.matched,
            unmatched_first = stats.unmatched_first,
            unmatched_second = stats.unmatched_second,
            peak_pending_keys = stats.peak_pending_keys,
            "correlation complete"
        );

        Ok(stats)
    }
}
