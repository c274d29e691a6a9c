//! IEEE 802.1Q / 802.1ad VLAN tags.

use super::ethernet::ethertype;

/// Tag length following the TPID: TCI (2 bytes) + inner EtherType (2 bytes).
const VLAN_TAG_LEN: usize = 4;

/// Deepest tag stack accepted before the frame is treated as garbage.
const MAX_TAG_DEPTH: usize = 4;

fn is_vlan(ether_type: u16) -> bool {
    matches!(
        ether_type,
        ethertype::VLAN | ethertype::QINQ | ethertype::QINQ_OLD
    )
}

/// Skip VLAN tags, returning the innermost EtherType and its payload.
///
/// `ether_type` is the type field that precedes `data`; the TPID of the
/// first tag has already been consumed by the Ethernet header.
pub fn strip_tags(mut ether_type: u16, mut data: &[u8]) -> Option<(u16, &[u8])> {
    let mut depth = 0;
    while is_vlan(ether_type) {
        if depth == MAX_TAG_DEPTH || data.len() < VLAN_TAG_LEN {
            return None;
        }
        ether_type = u16::from_be_bytes([data[2], data[3]]);
        data = &data[VLAN_TAG_LEN..];
        depth += 1;
    }
    Some((ether_type, data))
}
