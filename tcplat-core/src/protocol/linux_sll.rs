//! Linux SLL (Sockaddr Link Layer) framing.
//!
//! Cooked capture headers (LINKTYPE_LINUX_SLL = 113) are written when
//! capturing on the "any" interface.

use super::ethernet::ethertype;
use super::vlan;

/// PCAP link type for Linux SLL captures.
pub const LINKTYPE_LINUX_SLL: u16 = 113;

/// Linux SLL header length in bytes.
pub const LINUX_SLL_HEADER_LEN: usize = 16;

/// Strip the cooked header from an IPv4 packet.
pub fn ipv4_payload(data: &[u8]) -> Option<&[u8]> {
    if data.len() < LINUX_SLL_HEADER_LEN {
        return None;
    }

    // Bytes 14-15 carry the EtherType of the payload
    let protocol = u16::from_be_bytes([data[14], data[15]]);
    let (ether_type, payload) = vlan::strip_tags(protocol, &data[LINUX_SLL_HEADER_LEN..])?;
    (ether_type == ethertype::IPV4).then_some(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sll_header(protocol: u16) -> Vec<u8> {
        let mut header = vec![
            0x00, 0x00, // Packet type: HOST
            0x00, 0x01, // ARPHRD_ETHER
            0x00, 0x06, // Address length
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x00, 0x00, // Address + padding
        ];
        header.extend_from_slice(&protocol.to_be_bytes());
        header
    }

    #[test]
    fn test_ipv4_payload() {
        let mut packet = sll_header(ethertype::IPV4);
        packet.extend_from_slice(&[0x45, 0x00]);
        assert_eq!(ipv4_payload(&packet), Some(&[0x45, 0x00][..]));
    }

    #[test]
    fn test_ipv6_is_skipped() {
        let mut packet = sll_header(ethertype::IPV6);
        packet.extend_from_slice(&[0x60; 40]);
        assert_eq!(ipv4_payload(&packet), None);
    }

    #[test]
    fn test_short_header() {
        assert_eq!(ipv4_payload(&sll_header(ethertype::IPV4)[..12]), None);
    }
}
