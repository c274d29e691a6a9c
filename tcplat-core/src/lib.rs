//! # tcplat-core
//!
//! One-way TCP latency from two packet captures.
//!
//! Given captures of the same traffic taken at two points (for example
//! before and after a device under test), this crate finds each TCP packet
//! in both files and reports the difference between its two timestamps, as
//! described in RFC 1242. Output formatting and argument handling live in
//! the `tcplat` binary; this crate has no I/O beyond reading the captures.
//!
//! ## Features
//!
//! - **PCAP Reading**: legacy microsecond PCAP in either byte order, with
//!   transparent gzip (and optional zstd) decompression
//! - **Packet Identity**: IPv4/TCP keys over Ethernet (VLAN tagged or not),
//!   raw IP and Linux cooked captures
//! - **Correlation**: FIFO multiset matching, so repeated identical packets
//!   pair up in order
//! - **Streaming Reports**: rows go to a [`ReportSink`] as they are produced
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tcplat_core::prelude::*;
//!
//! let first = FileCaptureReader::open("ingress.pcap")?;
//! let second = FileCaptureReader::open("egress.pcap")?;
//!
//! let mut rows: Vec<ReportRow> = Vec::new();
//! let stats = LatencyPipeline::new(PipelineConfig::default())
//!     .run(first, second, &mut rows)?;
//!
//! for row in &rows {
//!     if let ReportRow::Matched(sample) = row {
//!         println!("{} {}", sample.key, sample.latency);
//!     }
//! }
//! println!("{} matched", stats.matched);
//! # Ok::<(), tcplat_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                           tcplat-core                               |
//! +---------------------------------------------------------------------+
//! |  pcap/       - CaptureReader, GlobalHeader, decompression           |
//! |  protocol/   - Link layers, IPv4/TCP decoding, TcpFlowKey           |
//! |  filter      - Raw frame byte filter                                |
//! |  correlate/  - FIFO multiset join of the two captures               |
//! |  report/     - LatencyPipeline, ReportSink                          |
//! |  error       - Error types                                          |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Crate Features
//!
//! - `compress-zstd` - Zstd decompression support
//! - `test-utils` - Packet and capture builders for tests

pub mod correlate;
pub mod error;
pub mod filter;
pub mod pcap;
pub mod prelude;
pub mod protocol;
pub mod report;
pub mod timestamp;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used types at crate root for convenience
pub use correlate::{
    Correlator, CorrelatorStats, MatchedPair, Observation, Origin, TaggedTimestamp,
    UnmatchedPacket,
};
pub use error::{Error, FilterError, FormatError, Result};
pub use filter::{ByteFilter, ByteMatch};
pub use pcap::{ByteOrder, CaptureReader, FileCaptureReader, GlobalHeader, RawPacket};
pub use protocol::{extract_key, parse_tcp_key, LinkLayer, TcpFlowKey};
pub use report::{
    CaptureStats, LatencyPipeline, LatencyReporter, LatencySample, PipelineConfig, ReadOrder,
    ReportRow, ReportSink, RunStats,
};
pub use timestamp::{CaptureTimestamp, Latency};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
