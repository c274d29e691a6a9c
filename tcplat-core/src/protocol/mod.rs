//! TCP packet identity extraction.
//!
//! Decodes just enough of each frame (link layer, IPv4, TCP) to build a
//! [`TcpFlowKey`]. Anything else yields `None`: non-IP traffic, IPv6,
//! non-TCP protocols, fragments and truncated headers are excluded from
//! correlation rather than reported as errors.
//!
//! ## Supported Link Layers
//!
//! | Link type | Framing |
//! |-----------|---------|
//! | 1 | Ethernet II, with optional 802.1Q / 802.1ad tags |
//! | 12, 14, 101, 228 | Raw IPv4 |
//! | 113 | Linux cooked capture (SLL) |

mod ethernet;
mod ipv4;
mod key;
mod linux_sll;
mod tcp;
mod vlan;

pub use ethernet::{ethertype, LINKTYPE_ETHERNET};
pub use ipv4::{Ipv4Datagram, DLT_RAW, DLT_RAW_OPENBSD, LINKTYPE_IPV4, LINKTYPE_RAW};
pub use key::TcpFlowKey;
pub use linux_sll::{LINKTYPE_LINUX_SLL, LINUX_SLL_HEADER_LEN};
pub use tcp::{TcpSegmentId, IP_PROTO_TCP};

use crate::pcap::RawPacket;

/// Link-layer framing of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLayer {
    Ethernet,
    RawIp,
    LinuxSll,
}

impl LinkLayer {
    /// Map a PCAP link type, or `None` if packets of that type cannot be keyed.
    pub fn from_link_type(link_type: u16) -> Option<Self> {
        match link_type {
            LINKTYPE_ETHERNET => Some(LinkLayer::Ethernet),
            LINKTYPE_RAW | LINKTYPE_IPV4 | DLT_RAW | DLT_RAW_OPENBSD => Some(LinkLayer::RawIp),
            LINKTYPE_LINUX_SLL => Some(LinkLayer::LinuxSll),
            _ => None,
        }
    }

    /// The IPv4 bytes inside a frame, if the frame carries IPv4.
    pub fn ipv4_payload(self, data: &[u8]) -> Option<&[u8]> {
        match self {
            LinkLayer::Ethernet => ethernet::ipv4_payload(data),
            LinkLayer::RawIp => Some(data),
            LinkLayer::LinuxSll => linux_sll::ipv4_payload(data),
        }
    }
}

/// Derive the identity key of a captured packet.
pub fn extract_key(packet: &RawPacket) -> Option<TcpFlowKey> {
    parse_tcp_key(packet.link_type, &packet.data, packet.is_truncated())
}

/// Derive the identity key of a frame of the given link type.
///
/// `snapped` marks frames cut short by the capture snap length, which may
/// legitimately lack payload bytes after the TCP header.
pub fn parse_tcp_key(link_type: u16, data: &[u8], snapped: bool) -> Option<TcpFlowKey> {
    let link = LinkLayer::from_link_type(link_type)?;
    let datagram = ipv4::parse(link.ipv4_payload(data)?, snapped)?;
    if datagram.protocol != IP_PROTO_TCP {
        return None;
    }
    let segment = tcp::parse(datagram.payload)?;

    Some(TcpFlowKey::from_headers(&datagram, &segment))
}
