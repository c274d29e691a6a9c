//! tcplat CLI entry point.

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tcplat::cli::{Args, OutputFormat, ReportPrinter};
use tcplat_core::{FileCaptureReader, LatencyPipeline, Origin};

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_level().into()),
        )
        .with_writer(io::stderr)
        .init();

    let first = open_capture(&args, Origin::First)?;
    let second = open_capture(&args, Origin::Second)?;
    debug!(
        first_link_type = first.link_type(),
        second_link_type = second.link_type(),
        "captures opened"
    );

    let stdout = io::stdout();
    let mut printer =
        ReportPrinter::new(args.format, BufWriter::new(stdout.lock())).quiet(args.quiet);

    let stats = LatencyPipeline::new(args.pipeline_config())
        .run(first, second, &mut printer)
        .map_err(|e| {
            let context = match e.origin() {
                Some(origin) => format!(
                    "Failed to read {origin} capture: {}",
                    args.capture_path(origin).display()
                ),
                None => "Failed to correlate captures".to_string(),
            };
            anyhow::Error::new(e).context(context)
        })?;

    let summary = printer.summary().clone();
    let mut out = printer.into_inner().context("Failed to write report")?;

    if !args.no_summary {
        // Keep machine-readable output parseable
        if args.format == OutputFormat::Text {
            summary.write(&mut out, &stats)?;
        } else {
            summary.write(&mut io::stderr().lock(), &stats)?;
        }
    }
    out.flush()?;

    Ok(())
}

fn open_capture(args: &Args, origin: Origin) -> Result<FileCaptureReader> {
    let path = args.capture_path(origin);
    FileCaptureReader::open(path)
        .with_context(|| format!("Failed to open {origin} capture: {}", path.display()))
}
