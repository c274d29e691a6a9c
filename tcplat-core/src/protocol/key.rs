//! Packet identity for cross-capture matching.

use std::fmt;
use std::net::Ipv4Addr;

use super::ipv4::Ipv4Datagram;
use super::tcp::TcpSegmentId;

/// Identity of a TCP packet per RFC 1242: two observations are the same
/// packet iff source/destination address, ports, sequence and
/// acknowledgement numbers are all equal.
///
/// Only produced from packets that decoded as IPv4 carrying TCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TcpFlowKey {
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    seq: u32,
    ack: u32,
}

impl TcpFlowKey {
    pub(crate) fn from_headers(ip: &Ipv4Datagram<'_>, tcp: &TcpSegmentId) -> Self {
        Self {
            src_ip: ip.source,
            dst_ip: ip.destination,
            src_port: tcp.src_port,
            dst_port: tcp.dst_port,
            seq: tcp.seq,
            ack: tcp.ack,
        }
    }

    /// Build a key directly from field values.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new(
        src_ip: Ipv4Addr,
        dst_ip: Ipv4Addr,
        src_port: u16,
        dst_port: u16,
        seq: u32,
        ack: u32,
    ) -> Self {
        Self {
            src_ip,
            dst_ip,
            src_port,
            dst_port,
            seq,
            ack,
        }
    }

    pub fn src_ip(&self) -> Ipv4Addr {
        self.src_ip
    }

    pub fn dst_ip(&self) -> Ipv4Addr {
        self.dst_ip
    }

    pub fn src_port(&self) -> u16 {
        self.src_port
    }

    pub fn dst_port(&self) -> u16 {
        self.dst_port
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    pub fn ack(&self) -> u32 {
        self.ack
    }
}

impl fmt::Display for TcpFlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} > {}:{} seq={} ack={}",
            self.src_ip, self.src_port, self.dst_ip, self.dst_port, self.seq, self.ack
        )
    }
}
