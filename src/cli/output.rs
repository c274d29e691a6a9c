//! Per-packet report output.
//!
//! [`ReportPrinter`] is the binary's [`ReportSink`]: it writes each row as it
//! arrives, in text, CSV or JSON Lines, and keeps a running
//! [`LatencySummary`].

use std::io::Write;

use clap::ValueEnum;
use serde_json::json;
use tcplat_core::{
    CaptureTimestamp, LatencySample, Origin, ReportRow, ReportSink, Result, TcpFlowKey,
    UnmatchedPacket,
};

use super::LatencySummary;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Frame numbers, packet identity and latency in microseconds (default)
    Text,
    /// Comma-separated values
    Csv,
    /// JSON Lines (one JSON object per row)
    Json,
}

const CSV_HEADER: &str = "status,first_frame,second_frame,src_ip,src_port,dst_ip,dst_port,seq,ack,first_ts,second_ts,latency_us";

/// Writes report rows to `W`.
pub struct ReportPrinter<W: Write> {
    format: OutputFormat,
    writer: W,
    quiet: bool,
    header_written: bool,
    summary: LatencySummary,
}

impl<W: Write> ReportPrinter<W> {
    /// Create a new printer with the specified format.
    pub fn new(format: OutputFormat, writer: W) -> Self {
        Self {
            format,
            writer,
            quiet: false,
            header_written: false,
            summary: LatencySummary::new(),
        }
    }

    /// Only accumulate the summary; write no rows.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn summary(&self) -> &LatencySummary {
        &self.summary
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> std::io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_row(&mut self, row: &ReportRow) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => self.write_text(row),
            OutputFormat::Csv => self.write_csv(row),
            OutputFormat::Json => self.write_json(row),
        }
    }

    fn write_text(&mut self, row: &ReportRow) -> std::io::Result<()> {
        match row {
            ReportRow::Matched(sample) => writeln!(
                self.writer,
                "{} {} {} {}",
                sample.first.frame_number,
                sample.second.frame_number,
                sample.key,
                sample.latency.as_micros()
            ),
            ReportRow::Unmatched(packet) => {
                let (first, second) = frames(packet);
                writeln!(self.writer, "{first} {second} {} miss", packet.key)
            }
        }
    }

    fn write_csv(&mut self, row: &ReportRow) -> std::io::Result<()> {
        if !self.header_written {
            writeln!(self.writer, "{CSV_HEADER}")?;
            self.header_written = true;
        }

        match row {
            ReportRow::Matched(sample) => writeln!(
                self.writer,
                "matched,{},{},{},{},{},{}",
                sample.first.frame_number,
                sample.second.frame_number,
                csv_key(&sample.key),
                sample.first.timestamp,
                sample.second.timestamp,
                sample.latency.as_micros()
            ),
            ReportRow::Unmatched(packet) => {
                let key = csv_key(&packet.key);
                let (frame, ts) = (packet.frame_number, packet.timestamp);
                match packet.origin {
                    Origin::First => writeln!(self.writer, "unmatched,{frame},,{key},{ts},,"),
                    Origin::Second => writeln!(self.writer, "unmatched,,{frame},{key},,{ts},"),
                }
            }
        }
    }

    fn write_json(&mut self, row: &ReportRow) -> std::io::Result<()> {
        let value = match row {
            ReportRow::Matched(sample) => matched_json(sample),
            ReportRow::Unmatched(packet) => unmatched_json(packet),
        };
        writeln!(self.writer, "{value}")
    }
}

impl<W: Write> ReportSink for ReportPrinter<W> {
    fn emit(&mut self, row: ReportRow) -> Result<()> {
        self.summary.record(&row);
        if !self.quiet {
            self.write_row(&row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Frame columns for an unmatched packet, `-` on the side it is missing from.
fn frames(packet: &UnmatchedPacket) -> (String, String) {
    let frame = packet.frame_number.to_string();
    match packet.origin {
        Origin::First => (frame, "-".to_string()),
        Origin::Second => ("-".to_string(), frame),
    }
}

fn csv_key(key: &TcpFlowKey) -> String {
    format!(
        "{},{},{},{},{},{}",
        key.src_ip(),
        key.src_port(),
        key.dst_ip(),
        key.dst_port(),
        key.seq(),
        key.ack()
    )
}

fn key_json(key: &TcpFlowKey) -> serde_json::Value {
    json!({
        "src_ip": key.src_ip().to_string(),
        "src_port": key.src_port(),
        "dst_ip": key.dst_ip().to_string(),
        "dst_port": key.dst_port(),
        "seq": key.seq(),
        "ack": key.ack(),
    })
}

fn timestamp_json(timestamp: CaptureTimestamp) -> serde_json::Value {
    serde_json::Value::String(timestamp.to_string())
}

fn matched_json(sample: &LatencySample) -> serde_json::Value {
    json!({
        "status": "matched",
        "key": key_json(&sample.key),
        "first_frame": sample.first.frame_number,
        "second_frame": sample.second.frame_number,
        "first_ts": timestamp_json(sample.first.timestamp),
        "second_ts": timestamp_json(sample.second.timestamp),
        "latency_us": sample.latency.as_micros(),
    })
}

fn unmatched_json(packet: &UnmatchedPacket) -> serde_json::Value {
    json!({
        "status": "unmatched",
        "origin": packet.origin.as_str(),
        "key": key_json(&packet.key),
        "frame": packet.frame_number,
        "ts": timestamp_json(packet.timestamp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    use tcplat_core::{Latency, Observation};

    fn key() -> TcpFlowKey {
        TcpFlowKey::new(
            Ipv4Addr::new(192, 168, 1, 1),
            Ipv4Addr::new(8, 8, 8, 8),
            40000,
            443,
            1000,
            2000,
        )
    }

    fn rows() -> Vec<ReportRow> {
        vec![
            ReportRow::Matched(LatencySample {
                key: key(),
                first: Observation {
                    timestamp: CaptureTimestamp::new(100, 500),
                    frame_number: 1,
                },
                second: Observation {
                    timestamp: CaptureTimestamp::new(100, 300),
                    frame_number: 4,
                },
                latency: Latency::from_micros(-200),
            }),
            ReportRow::Unmatched(UnmatchedPacket {
                key: key(),
                origin: Origin::Second,
                timestamp: CaptureTimestamp::new(101, 7),
                frame_number: 9,
            }),
        ]
    }

    fn render(format: OutputFormat, quiet: bool) -> String {
        let mut printer = ReportPrinter::new(format, Vec::new()).quiet(quiet);
        for row in rows() {
            printer.emit(row).unwrap();
        }
        printer.finish().unwrap();
        String::from_utf8(printer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_text_output() {
        let output = render(OutputFormat::Text, false);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines,
            vec![
                "1 4 192.168.1.1:40000 > 8.8.8.8:443 seq=1000 ack=2000 -200",
                "- 9 192.168.1.1:40000 > 8.8.8.8:443 seq=1000 ack=2000 miss",
            ]
        );
    }

    #[test]
    fn test_csv_output() {
        let output = render(OutputFormat::Csv, false);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "matched,1,4,192.168.1.1,40000,8.8.8.8,443,1000,2000,100.000500,100.000300,-200"
        );
        assert_eq!(
            lines[2],
            "unmatched,,9,192.168.1.1,40000,8.8.8.8,443,1000,2000,,101.000007,"
        );
        // Every line has the same number of columns
        let columns = CSV_HEADER.split(',').count();
        assert!(lines.iter().all(|l| l.split(',').count() == columns));
    }

    #[test]
    fn test_csv_unmatched_first_leaves_second_columns_empty() {
        let mut printer = ReportPrinter::new(OutputFormat::Csv, Vec::new());
        printer
            .emit(ReportRow::Unmatched(UnmatchedPacket {
                key: key(),
                origin: Origin::First,
                timestamp: CaptureTimestamp::new(5, 120),
                frame_number: 3,
            }))
            .unwrap();
        let output = String::from_utf8(printer.into_inner().unwrap()).unwrap();

        assert_eq!(
            output.lines().nth(1),
            Some("unmatched,3,,192.168.1.1,40000,8.8.8.8,443,1000,2000,5.000120,,")
        );
    }

    #[test]
    fn test_json_output() {
        let output = render(OutputFormat::Json, false);
        let values: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(values[0]["status"], "matched");
        assert_eq!(values[0]["latency_us"], -200);
        assert_eq!(values[0]["key"]["src_ip"], "192.168.1.1");
        assert_eq!(values[0]["first_ts"], "100.000500");
        assert_eq!(values[1]["status"], "unmatched");
        assert_eq!(values[1]["origin"], "second");
        assert_eq!(values[1]["frame"], 9);
    }

    #[test]
    fn test_quiet_still_summarizes() {
        let mut printer = ReportPrinter::new(OutputFormat::Text, Vec::new()).quiet(true);
        for row in rows() {
            printer.emit(row).unwrap();
        }

        assert_eq!(printer.summary().matched(), 1);
        assert_eq!(printer.summary().unmatched(Origin::Second), 1);
        assert!(printer.into_inner().unwrap().is_empty());
    }
}
