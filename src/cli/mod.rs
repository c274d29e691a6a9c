//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Per-packet output formatting (text, CSV, JSON)
//! - The end-of-run summary

mod args;
mod output;
mod summary;

pub use args::{Args, ReadOrderArg};
pub use output::{OutputFormat, ReportPrinter};
pub use summary::LatencySummary;
