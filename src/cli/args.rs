//! Command-line argument definitions.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use tcplat_core::{ByteFilter, ByteMatch, Origin, PipelineConfig, ReadOrder};

use super::OutputFormat;

/// Read order of the two captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReadOrderArg {
    /// Interleave both captures by timestamp (lower memory)
    Merged,
    /// Read the first capture fully, then the second
    Sequential,
}

impl From<ReadOrderArg> for ReadOrder {
    fn from(arg: ReadOrderArg) -> Self {
        match arg {
            ReadOrderArg::Merged => ReadOrder::Merged,
            ReadOrderArg::Sequential => ReadOrder::Sequential,
        }
    }
}

/// Measure one-way TCP latency between two packet captures.
///
/// Each TCP packet seen in both captures is reported with its latency
/// (second timestamp minus first, in microseconds). Packets seen in only
/// one capture are reported as "miss".
#[derive(Parser, Debug)]
#[command(name = "tcplat")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Capture taken at the first (ingress) point
    #[arg(value_name = "FIRST")]
    pub first: PathBuf,

    /// Capture taken at the second (egress) point
    #[arg(value_name = "SECOND")]
    pub second: PathBuf,

    /// Only use frames whose byte at OFFSET equals VALUE (repeatable)
    #[arg(
        short = 'f',
        long = "filter",
        value_name = "OFFSET:VALUE",
        value_delimiter = ','
    )]
    pub filter: Vec<ByteMatch>,

    /// Print only the summary, not one row per packet
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Per-packet row format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Order in which the captures are read
    #[arg(long = "read-order", value_enum, default_value = "merged")]
    pub read_order: ReadOrderArg,

    /// Do not print the summary
    #[arg(long = "no-summary")]
    pub no_summary: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Pipeline settings selected on the command line.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_filter(ByteFilter::new(self.filter.clone()))
            .with_read_order(self.read_order.into())
    }

    /// Path of the capture for `origin`.
    pub fn capture_path(&self, origin: Origin) -> &Path {
        match origin {
            Origin::First => &self.first,
            Origin::Second => &self.second,
        }
    }

    /// Log level used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
