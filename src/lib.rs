//! tcplat - measure one-way TCP latency from two packet captures.
//!
//! This crate is the command-line front end: argument parsing, output
//! formatting and the end-of-run summary. Capture reading and packet
//! correlation live in [`tcplat_core`].
//!
//! # Example
//!
//! ```no_run
//! use tcplat::cli::{OutputFormat, ReportPrinter};
//! use tcplat_core::{FileCaptureReader, LatencyPipeline, PipelineConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let first = FileCaptureReader::open("ingress.pcap")?;
//!     let second = FileCaptureReader::open("egress.pcap")?;
//!
//!     let mut printer = ReportPrinter::new(OutputFormat::Csv, std::io::stdout());
//!     let stats = LatencyPipeline::new(PipelineConfig::default())
//!         .run(first, second, &mut printer)?;
//!     println!("{} matched", stats.matched);
//!     Ok(())
//! }
//! ```

pub mod cli;

pub use tcplat_core::{Error, Result};
