//! Fuzz target for legacy capture parsing.
//!
//! Tests handling of malformed capture files including:
//! - Magic number and byte order detection
//! - Global header parsing
//! - Record headers (caplen, origlen, timestamps) and truncation
//! - Key extraction on whatever records decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use tcplat_core::{extract_key, CaptureReader};

fuzz_target!(|data: &[u8]| {
    let Ok(mut reader) = CaptureReader::new(Cursor::new(data)) else {
        return;
    };

    // Read until end of input or the first format error - should never panic
    while let Ok(Some(packet)) = reader.next_packet() {
        assert_eq!(packet.data.len(), packet.captured_length as usize);
        let _ = extract_key(&packet);
    }
});
