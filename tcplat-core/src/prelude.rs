//! Convenient re-exports for common usage.
//!
//! ```rust,no_run
//! use tcplat_core::prelude::*;
//!
//! let config = PipelineConfig::default().with_read_order(ReadOrder::Sequential);
//! ```

// Reading
pub use crate::pcap::{CaptureReader, FileCaptureReader, RawPacket};

// Identity and correlation
pub use crate::correlate::{Correlator, MatchedPair, Origin, UnmatchedPacket};
pub use crate::protocol::{extract_key, TcpFlowKey};
pub use crate::timestamp::{CaptureTimestamp, Latency};

// Reporting
pub use crate::filter::ByteFilter;
pub use crate::report::{
    LatencyPipeline, LatencySample, PipelineConfig, ReadOrder, ReportRow, ReportSink, RunStats,
};

// Error types
pub use crate::error::{Error, Result};
