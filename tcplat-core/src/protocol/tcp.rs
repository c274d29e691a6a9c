//! TCP header decoding.

use etherparse::TcpHeaderSlice;

/// IP protocol number for TCP.
pub const IP_PROTO_TCP: u8 = 6;

/// The TCP header fields that identify a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpSegmentId {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
}

/// Decode the identifying fields of a TCP header.
///
/// Fails when the header (including options, per the data offset) is not
/// fully present in `segment`.
pub fn parse(segment: &[u8]) -> Option<TcpSegmentId> {
    let tcp = TcpHeaderSlice::from_slice(segment).ok()?;

    Some(TcpSegmentId {
        src_port: tcp.source_port(),
        dst_port: tcp.destination_port(),
        seq: tcp.sequence_number(),
        ack: tcp.acknowledgment_number(),
    })
}
