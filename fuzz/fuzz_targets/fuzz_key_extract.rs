//! Fuzz target for TCP key extraction.
//!
//! Exercises every supported link layer, VLAN tag stripping, IPv4 length
//! checks and TCP header bounds, with and without snapped records.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tcplat_core::parse_tcp_key;

fuzz_target!(|data: &[u8]| {
    for link_type in [1, 12, 14, 101, 113, 228] {
        let whole = parse_tcp_key(link_type, data, false);
        let snapped = parse_tcp_key(link_type, data, true);

        // Tolerating a snapped payload never rejects a complete frame
        if whole.is_some() {
            assert_eq!(whole, snapped);
        }
    }
});
