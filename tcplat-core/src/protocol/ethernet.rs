//! Ethernet II framing.

use etherparse::Ethernet2HeaderSlice;

use super::vlan;

/// Link type constant for Ethernet.
pub const LINKTYPE_ETHERNET: u16 = 1;

/// EtherType values the extractor cares about.
pub mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const VLAN: u16 = 0x8100;
    pub const IPV6: u16 = 0x86DD;
    pub const QINQ: u16 = 0x88A8;
    pub const QINQ_OLD: u16 = 0x9100;
}

/// Strip the Ethernet header (and any VLAN tags) from an IPv4 frame.
///
/// Returns `None` when the frame is too short or does not carry IPv4.
pub fn ipv4_payload(data: &[u8]) -> Option<&[u8]> {
    let eth = Ethernet2HeaderSlice::from_slice(data).ok()?;
    let header_len = eth.slice().len();

    let (ether_type, payload) = vlan::strip_tags(eth.ether_type().0, &data[header_len..])?;
    (ether_type == ethertype::IPV4).then_some(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::EthernetBuilder;

    #[test]
    fn test_ipv4_frame() {
        let frame = EthernetBuilder::new().payload(vec![0x45, 0x00]).build();
        assert_eq!(ipv4_payload(&frame), Some(&[0x45, 0x00][..]));
    }

    #[test]
    fn test_non_ipv4_frames() {
        let ipv6 = EthernetBuilder::new().ipv6().payload(vec![0x60; 40]).build();
        assert_eq!(ipv4_payload(&ipv6), None);

        let arp = EthernetBuilder::new().arp().payload(vec![0; 28]).build();
        assert_eq!(ipv4_payload(&arp), None);
    }

    #[test]
    fn test_short_frame() {
        let frame = EthernetBuilder::new().build();
        assert_eq!(ipv4_payload(&frame[..10]), None);
    }

    #[test]
    fn test_vlan_tagged_frame() {
        let frame = EthernetBuilder::new()
            .vlan(100)
            .payload(vec![0x45, 0x00, 0x00])
            .build();
        assert_eq!(ipv4_payload(&frame), Some(&[0x45, 0x00, 0x00][..]));
    }
}
