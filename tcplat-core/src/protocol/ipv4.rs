//! IPv4 header decoding.

use std::net::Ipv4Addr;

use etherparse::Ipv4HeaderSlice;

/// PCAP link type for raw IP packets.
pub const LINKTYPE_RAW: u16 = 101;

/// PCAP link type for raw IPv4 packets.
pub const LINKTYPE_IPV4: u16 = 228;

/// DLT_RAW as written by most BSD and Linux libpcap builds.
pub const DLT_RAW: u16 = 12;

/// DLT_RAW as written by OpenBSD.
pub const DLT_RAW_OPENBSD: u16 = 14;

/// A whole (unfragmented) IPv4 datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Datagram<'a> {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub protocol: u8,
    /// Transport bytes, bounded by the header's total length.
    pub payload: &'a [u8],
}

/// Decode an IPv4 header and bound its payload.
///
/// Returns `None` for non-IPv4 data, fragments, and datagrams whose
/// declared lengths do not fit the captured bytes. When `snapped` is set
/// the record was cut by the snap length, so a total length running past
/// the captured bytes only shortens the payload.
pub fn parse(data: &[u8], snapped: bool) -> Option<Ipv4Datagram<'_>> {
    let ipv4 = Ipv4HeaderSlice::from_slice(data).ok()?;

    if ipv4.more_fragments() || ipv4.fragments_offset().value() != 0 {
        return None;
    }

    let header_len = ipv4.slice().len();
    let total_len = ipv4.total_len() as usize;
    if total_len < header_len {
        return None;
    }

    // Anything past total_len is link-layer padding.
    let end = if total_len <= data.len() {
        total_len
    } else if snapped {
        data.len()
    } else {
        return None;
    };

    Some(Ipv4Datagram {
        source: ipv4.source_addr(),
        destination: ipv4.destination_addr(),
        protocol: ipv4.protocol().0,
        payload: &data[header_len..end],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::Ipv4Builder;

    #[test]
    fn test_parse_ipv4() {
        let packet = Ipv4Builder::new()
            .src_ip([10, 0, 0, 1])
            .dst_ip([10, 0, 0, 2])
            .payload(vec![0xaa; 20])
            .build();

        let datagram = parse(&packet, false).unwrap();
        assert_eq!(datagram.source, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(datagram.destination, Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(datagram.protocol, 6);
        assert_eq!(datagram.payload.len(), 20);
    }

    #[test]
    fn test_options_are_skipped() {
        let packet = Ipv4Builder::new().ihl(6).payload(vec![0xaa; 20]).build();

        let datagram = parse(&packet, false).unwrap();
        assert_eq!(datagram.payload, &[0xaa; 20][..]);
    }

    #[test]
    fn test_trailing_padding_is_ignored() {
        let mut packet = Ipv4Builder::new().payload(vec![0xaa; 20]).build();
        packet.extend_from_slice(&[0x00; 6]);

        let datagram = parse(&packet, false).unwrap();
        assert_eq!(datagram.payload.len(), 20);
    }

    #[test]
    fn test_fragments_are_rejected() {
        let first = Ipv4Builder::new()
            .more_fragments()
            .payload(vec![0xaa; 24])
            .build();
        assert!(parse(&first, false).is_none());

        let later = Ipv4Builder::new()
            .fragment_offset(3)
            .payload(vec![0xaa; 24])
            .build();
        assert!(parse(&later, false).is_none());
    }

    #[test]
    fn test_total_length_past_capture() {
        let packet = Ipv4Builder::new()
            .total_length(1500)
            .payload(vec![0xaa; 20])
            .build();

        assert!(parse(&packet, false).is_none());
        assert_eq!(parse(&packet, true).unwrap().payload.len(), 20);
    }

    #[test]
    fn test_not_ipv4() {
        let mut ipv6 = vec![0x60, 0x00, 0x00, 0x00];
        ipv6.resize(40, 0);
        assert!(parse(&ipv6, false).is_none());
        assert!(parse(&[0x45, 0x00], false).is_none());
    }
}
