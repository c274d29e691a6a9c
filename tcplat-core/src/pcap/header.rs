//! Legacy PCAP global header and byte-order detection.

use crate::error::FormatError;

/// Size of the legacy PCAP global header.
pub const GLOBAL_HEADER_LEN: usize = 24;

/// Size of a legacy PCAP record header.
pub const RECORD_HEADER_LEN: usize = 16;

/// Legacy microsecond magic number, as written by the capturing host.
const MAGIC_MICROS: u32 = 0xa1b2c3d4;

/// Legacy nanosecond magic number.
const MAGIC_NANOS: u32 = 0xa1b23c4d;

/// PCAPNG section header block type.
const MAGIC_PCAPNG: u32 = 0x0a0d0d0a;

/// Gzip magic bytes.
pub(crate) const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Zstd frame magic bytes.
pub(crate) const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Byte order of every multi-byte field in a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Resolve the byte order from the first four bytes of a capture.
    ///
    /// Only the microsecond legacy signature is accepted, in either order.
    pub fn from_magic(bytes: [u8; 4]) -> Result<Self, FormatError> {
        if u32::from_le_bytes(bytes) == MAGIC_MICROS {
            return Ok(ByteOrder::Little);
        }
        if u32::from_be_bytes(bytes) == MAGIC_MICROS {
            return Ok(ByteOrder::Big);
        }

        let le = u32::from_le_bytes(bytes);
        let be = u32::from_be_bytes(bytes);
        if le == MAGIC_NANOS || be == MAGIC_NANOS {
            return Err(FormatError::UnsupportedFormat {
                format: "legacy PCAP with nanosecond timestamps",
            });
        }
        if be == MAGIC_PCAPNG {
            return Err(FormatError::UnsupportedFormat { format: "PCAPNG" });
        }
        if bytes[..2] == GZIP_MAGIC || bytes == ZSTD_MAGIC {
            return Err(FormatError::UnsupportedFormat {
                format: "compressed stream (open the capture by path to decompress it)",
            });
        }

        Err(FormatError::BadMagic { magic: be })
    }

    #[inline]
    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    #[inline]
    pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }

    #[inline]
    pub fn read_i32(self, bytes: [u8; 4]) -> i32 {
        match self {
            ByteOrder::Little => i32::from_le_bytes(bytes),
            ByteOrder::Big => i32::from_be_bytes(bytes),
        }
    }
}

/// The 24-byte header at the start of a legacy capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalHeader {
    pub byte_order: ByteOrder,
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT to local correction (seconds). Almost always zero.
    pub thiszone: i32,
    /// Timestamp accuracy. Almost always zero.
    pub sigfigs: u32,
    /// Maximum captured length per record.
    pub snaplen: u32,
    /// Link type, possibly with FCS information in the upper bits.
    pub network: u32,
}

impl GlobalHeader {
    /// Decode a global header, resolving the byte order from its magic number.
    pub fn parse(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < 4 {
            return Err(FormatError::TruncatedHeader {
                needed: GLOBAL_HEADER_LEN,
                available: data.len(),
            });
        }

        // A bad magic number is the more useful report for short garbage input.
        let byte_order = ByteOrder::from_magic([data[0], data[1], data[2], data[3]])?;

        if data.len() < GLOBAL_HEADER_LEN {
            return Err(FormatError::TruncatedHeader {
                needed: GLOBAL_HEADER_LEN,
                available: data.len(),
            });
        }

        let u16_at = |at: usize| byte_order.read_u16([data[at], data[at + 1]]);
        let u32_at =
            |at: usize| byte_order.read_u32([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        Ok(Self {
            byte_order,
            version_major: u16_at(4),
            version_minor: u16_at(6),
            thiszone: byte_order.read_i32([data[8], data[9], data[10], data[11]]),
            sigfigs: u32_at(12),
            snaplen: u32_at(16),
            network: u32_at(20),
        })
    }

    /// Link-layer type of every record (e.g., 1 = Ethernet).
    #[inline]
    pub fn link_type(&self) -> u16 {
        (self.network & 0xffff) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(order: ByteOrder) -> Vec<u8> {
        let mut data = Vec::new();
        match order {
            ByteOrder::Little => {
                data.extend_from_slice(&MAGIC_MICROS.to_le_bytes());
                data.extend_from_slice(&2u16.to_le_bytes());
                data.extend_from_slice(&4u16.to_le_bytes());
                data.extend_from_slice(&(-3600i32).to_le_bytes());
                data.extend_from_slice(&0u32.to_le_bytes());
                data.extend_from_slice(&65535u32.to_le_bytes());
                data.extend_from_slice(&113u32.to_le_bytes());
            }
            ByteOrder::Big => {
                data.extend_from_slice(&MAGIC_MICROS.to_be_bytes());
                data.extend_from_slice(&2u16.to_be_bytes());
                data.extend_from_slice(&4u16.to_be_bytes());
                data.extend_from_slice(&(-3600i32).to_be_bytes());
                data.extend_from_slice(&0u32.to_be_bytes());
                data.extend_from_slice(&65535u32.to_be_bytes());
                data.extend_from_slice(&113u32.to_be_bytes());
            }
        }
        data
    }

    #[test]
    fn test_byte_order_from_magic() {
        assert_eq!(
            ByteOrder::from_magic([0xd4, 0xc3, 0xb2, 0xa1]).unwrap(),
            ByteOrder::Little
        );
        assert_eq!(
            ByteOrder::from_magic([0xa1, 0xb2, 0xc3, 0xd4]).unwrap(),
            ByteOrder::Big
        );
    }

    #[test]
    fn test_rejects_other_signatures() {
        assert!(matches!(
            ByteOrder::from_magic([0x4d, 0x3c, 0xb2, 0xa1]),
            Err(FormatError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            ByteOrder::from_magic([0x0a, 0x0d, 0x0d, 0x0a]),
            Err(FormatError::UnsupportedFormat { format: "PCAPNG" })
        ));
        assert!(matches!(
            ByteOrder::from_magic([0x1f, 0x8b, 0x08, 0x00]),
            Err(FormatError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            ByteOrder::from_magic([0xde, 0xad, 0xbe, 0xef]),
            Err(FormatError::BadMagic { magic: 0xdeadbeef })
        ));
    }

    #[test]
    fn test_parse_both_byte_orders_agree() {
        let le = GlobalHeader::parse(&header_bytes(ByteOrder::Little)).unwrap();
        let be = GlobalHeader::parse(&header_bytes(ByteOrder::Big)).unwrap();

        assert_eq!(le.byte_order, ByteOrder::Little);
        assert_eq!(be.byte_order, ByteOrder::Big);
        for header in [le, be] {
            assert_eq!(header.version_major, 2);
            assert_eq!(header.version_minor, 4);
            assert_eq!(header.thiszone, -3600);
            assert_eq!(header.snaplen, 65535);
            assert_eq!(header.link_type(), 113);
        }
    }

    #[test]
    fn test_truncated_header() {
        let data = header_bytes(ByteOrder::Little);
        assert!(matches!(
            GlobalHeader::parse(&data[..10]),
            Err(FormatError::TruncatedHeader {
                needed: 24,
                available: 10
            })
        ));
        assert!(matches!(
            GlobalHeader::parse(&data[..2]),
            Err(FormatError::TruncatedHeader { available: 2, .. })
        ));
    }

    #[test]
    fn test_link_type_masks_fcs_bits() {
        let mut data = header_bytes(ByteOrder::Little);
        data[20..24].copy_from_slice(&0x1000_0001u32.to_le_bytes());
        let header = GlobalHeader::parse(&data).unwrap();
        assert_eq!(header.link_type(), 1);
    }
}
