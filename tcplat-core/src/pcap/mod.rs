//! Legacy PCAP reading.
//!
//! The main types are:
//! - [`CaptureReader`] - lazy record reader over any `Read` source
//! - [`GlobalHeader`] / [`ByteOrder`] - the decoded file header
//! - [`RawPacket`] - one captured record

mod decompress;
mod header;
mod packet;
mod reader;

pub use decompress::Compression;
pub use header::{ByteOrder, GlobalHeader, GLOBAL_HEADER_LEN, RECORD_HEADER_LEN};
pub use packet::RawPacket;
pub use reader::{CaptureReader, FileCaptureReader};
