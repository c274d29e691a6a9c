//! Raw packet representation.

use bytes::Bytes;

use crate::timestamp::CaptureTimestamp;

/// A raw packet record from a capture file.
#[derive(Debug, Clone)]
pub struct RawPacket {
    /// Frame number (1-indexed).
    pub frame_number: u64,

    /// Record timestamp.
    pub timestamp: CaptureTimestamp,

    /// Captured length (may be less than original).
    pub captured_length: u32,

    /// Original length on the wire.
    pub original_length: u32,

    /// Link layer type (e.g., 1 = Ethernet).
    pub link_type: u16,

    /// Exactly `captured_length` bytes of frame data.
    pub data: Bytes,
}

impl RawPacket {
    /// Check if the packet was cut short by the capture snap length.
    pub fn is_truncated(&self) -> bool {
        self.captured_length < self.original_length
    }
}
