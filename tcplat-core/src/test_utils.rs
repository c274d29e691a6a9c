//! Test utilities.
//!
//! Builders for constructing frames and in-memory legacy captures. Compiled
//! for unit tests and, through the `test-utils` feature, for the integration
//! tests of dependent crates.

use crate::pcap::ByteOrder;

/// Builder for constructing Ethernet frames.
#[derive(Debug, Clone)]
pub struct EthernetBuilder {
    src_mac: [u8; 6],
    dst_mac: [u8; 6],
    vlan_tags: Vec<(u16, u16)>,
    ethertype: u16,
    payload: Vec<u8>,
}

impl Default for EthernetBuilder {
    fn default() -> Self {
        Self {
            src_mac: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
            dst_mac: [0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            vlan_tags: Vec::new(),
            ethertype: 0x0800, // IPv4
            payload: Vec::new(),
        }
    }
}

impl EthernetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ethertype(mut self, ethertype: u16) -> Self {
        self.ethertype = ethertype;
        self
    }

    pub fn ipv6(self) -> Self {
        self.ethertype(0x86DD)
    }

    pub fn arp(self) -> Self {
        self.ethertype(0x0806)
    }

    /// Push an 802.1Q tag (outermost first).
    pub fn vlan(mut self, vlan_id: u16) -> Self {
        self.vlan_tags.push((0x8100, vlan_id));
        self
    }

    /// Push an 802.1ad service tag.
    pub fn qinq(mut self, vlan_id: u16) -> Self {
        self.vlan_tags.push((0x88A8, vlan_id));
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(14 + 4 * self.vlan_tags.len() + self.payload.len());
        frame.extend_from_slice(&self.dst_mac);
        frame.extend_from_slice(&self.src_mac);
        for (tpid, vlan_id) in &self.vlan_tags {
            frame.extend_from_slice(&tpid.to_be_bytes());
            frame.extend_from_slice(&(vlan_id & 0x0fff).to_be_bytes());
        }
        frame.extend_from_slice(&self.ethertype.to_be_bytes());
        frame.extend_from_slice(&self.payload);
        frame
    }
}

/// Builder for constructing IPv4 headers.
#[derive(Debug, Clone)]
pub struct Ipv4Builder {
    ihl: u8,
    total_length: Option<u16>,
    identification: u16,
    flags_fragment: u16,
    ttl: u8,
    protocol: u8,
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    payload: Vec<u8>,
}

impl Default for Ipv4Builder {
    fn default() -> Self {
        Self {
            ihl: 5,
            total_length: None, // Computed on build
            identification: 0x0001,
            flags_fragment: 0x4000, // Don't fragment
            ttl: 64,
            protocol: 6, // TCP
            src_ip: [192, 168, 1, 1],
            dst_ip: [192, 168, 1, 2],
            payload: Vec::new(),
        }
    }
}

impl Ipv4Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn udp(self) -> Self {
        self.protocol(17)
    }

    pub fn icmp(self) -> Self {
        self.protocol(1)
    }

    pub fn src_ip(mut self, ip: [u8; 4]) -> Self {
        self.src_ip = ip;
        self
    }

    pub fn dst_ip(mut self, ip: [u8; 4]) -> Self {
        self.dst_ip = ip;
        self
    }

    pub fn ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn identification(mut self, id: u16) -> Self {
        self.identification = id;
        self
    }

    /// Header length in 32-bit words; words past 5 are NOP options.
    pub fn ihl(mut self, ihl: u8) -> Self {
        self.ihl = ihl;
        self
    }

    /// Override the computed total length field.
    pub fn total_length(mut self, total_length: u16) -> Self {
        self.total_length = Some(total_length);
        self
    }

    pub fn more_fragments(mut self) -> Self {
        self.flags_fragment = (self.flags_fragment & !0x4000) | 0x2000;
        self
    }

    /// Fragment offset in 8-byte units.
    pub fn fragment_offset(mut self, offset: u16) -> Self {
        self.flags_fragment = (self.flags_fragment & !0x5fff) | (offset & 0x1fff);
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let header_len = self.ihl as usize * 4;
        let total_length = self
            .total_length
            .unwrap_or((header_len + self.payload.len()) as u16);
        let mut packet = Vec::with_capacity(header_len + self.payload.len());

        packet.push(0x40 | (self.ihl & 0x0f));
        packet.push(0x00); // DSCP + ECN
        packet.extend_from_slice(&total_length.to_be_bytes());
        packet.extend_from_slice(&self.identification.to_be_bytes());
        packet.extend_from_slice(&self.flags_fragment.to_be_bytes());
        packet.push(self.ttl);
        packet.push(self.protocol);
        packet.extend_from_slice(&[0x00, 0x00]); // Checksum (not calculated)
        packet.extend_from_slice(&self.src_ip);
        packet.extend_from_slice(&self.dst_ip);
        packet.resize(header_len.max(20), 0x01); // NOP options
        packet.extend_from_slice(&self.payload);

        packet
    }
}

/// Builder for constructing TCP headers.
#[derive(Debug, Clone)]
pub struct TcpBuilder {
    src_port: u16,
    dst_port: u16,
    seq: u32,
    ack: u32,
    data_offset: u8,
    flags: u8,
    window: u16,
    payload: Vec<u8>,
}

impl Default for TcpBuilder {
    fn default() -> Self {
        Self {
            src_port: 12345,
            dst_port: 80,
            seq: 1,
            ack: 0,
            data_offset: 5, // 20 bytes
            flags: 0x10,    // ACK
            window: 65535,
            payload: Vec::new(),
        }
    }
}

impl TcpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_port(mut self, port: u16) -> Self {
        self.src_port = port;
        self
    }

    pub fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub fn seq(mut self, seq: u32) -> Self {
        self.seq = seq;
        self
    }

    pub fn ack_num(mut self, ack: u32) -> Self {
        self.ack = ack;
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn syn(self) -> Self {
        self.flags(0x02)
    }

    pub fn psh_ack(self) -> Self {
        self.flags(0x18)
    }

    /// Header length in 32-bit words; words past 5 are NOP options.
    pub fn data_offset(mut self, data_offset: u8) -> Self {
        self.data_offset = data_offset;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let header_len = self.data_offset as usize * 4;
        let mut segment = Vec::with_capacity(header_len + self.payload.len());

        segment.extend_from_slice(&self.src_port.to_be_bytes());
        segment.extend_from_slice(&self.dst_port.to_be_bytes());
        segment.extend_from_slice(&self.seq.to_be_bytes());
        segment.extend_from_slice(&self.ack.to_be_bytes());
        segment.push(self.data_offset << 4); // Data offset + reserved
        segment.push(self.flags);
        segment.extend_from_slice(&self.window.to_be_bytes());
        segment.extend_from_slice(&[0x00, 0x00]); // Checksum
        segment.extend_from_slice(&[0x00, 0x00]); // Urgent pointer
        segment.resize(header_len.max(20), 0x01); // NOP options
        segment.extend_from_slice(&self.payload);

        segment
    }
}

/// Builder for constructing UDP datagrams.
#[derive(Debug, Clone)]
pub struct UdpBuilder {
    src_port: u16,
    dst_port: u16,
    payload: Vec<u8>,
}

impl Default for UdpBuilder {
    fn default() -> Self {
        Self {
            src_port: 12345,
            dst_port: 53,
            payload: Vec::new(),
        }
    }
}

impl UdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_port(mut self, port: u16) -> Self {
        self.src_port = port;
        self
    }

    pub fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let length = 8 + self.payload.len() as u16;
        let mut datagram = Vec::with_capacity(8 + self.payload.len());

        datagram.extend_from_slice(&self.src_port.to_be_bytes());
        datagram.extend_from_slice(&self.dst_port.to_be_bytes());
        datagram.extend_from_slice(&length.to_be_bytes());
        datagram.extend_from_slice(&[0x00, 0x00]); // Checksum
        datagram.extend_from_slice(&self.payload);

        datagram
    }
}

/// Ethernet/IPv4/TCP frame carrying the given identity fields.
pub fn tcp_frame(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    seq: u32,
    ack: u32,
) -> Vec<u8> {
    let tcp = TcpBuilder::new()
        .src_port(src_port)
        .dst_port(dst_port)
        .seq(seq)
        .ack_num(ack)
        .build();
    let ip = Ipv4Builder::new()
        .src_ip(src_ip)
        .dst_ip(dst_ip)
        .payload(tcp)
        .build();
    EthernetBuilder::new().payload(ip).build()
}

/// Ethernet/IPv4/UDP frame.
pub fn udp_frame(src_ip: [u8; 4], dst_ip: [u8; 4], src_port: u16, dst_port: u16) -> Vec<u8> {
    let udp = UdpBuilder::new()
        .src_port(src_port)
        .dst_port(dst_port)
        .payload(vec![0xab; 12])
        .build();
    let ip = Ipv4Builder::new()
        .udp()
        .src_ip(src_ip)
        .dst_ip(dst_ip)
        .payload(udp)
        .build();
    EthernetBuilder::new().payload(ip).build()
}

#[derive(Debug, Clone)]
struct Record {
    secs: u32,
    micros: u32,
    original_length: u32,
    data: Vec<u8>,
}

/// Builder for in-memory legacy captures.
#[derive(Debug, Clone)]
pub struct CaptureBuilder {
    byte_order: ByteOrder,
    link_type: u32,
    snaplen: u32,
    records: Vec<Record>,
}

impl Default for CaptureBuilder {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Little,
            link_type: 1, // Ethernet
            snaplen: 65535,
            records: Vec::new(),
        }
    }
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn link_type(mut self, link_type: u32) -> Self {
        self.link_type = link_type;
        self
    }

    pub fn snaplen(mut self, snaplen: u32) -> Self {
        self.snaplen = snaplen;
        self
    }

    /// Append a record captured in full.
    pub fn packet(self, secs: u32, micros: u32, data: Vec<u8>) -> Self {
        let original_length = data.len() as u32;
        self.snapped_packet(secs, micros, data, original_length)
    }

    /// Append a record whose wire length exceeds the captured bytes.
    pub fn snapped_packet(
        mut self,
        secs: u32,
        micros: u32,
        data: Vec<u8>,
        original_length: u32,
    ) -> Self {
        self.records.push(Record {
            secs,
            micros,
            original_length,
            data,
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let order = self.byte_order;
        let u16_bytes = |v: u16| match order {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        };
        let u32_bytes = |v: u32| match order {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        };

        let mut data = Vec::new();
        data.extend_from_slice(&u32_bytes(0xa1b2c3d4)); // Magic
        data.extend_from_slice(&u16_bytes(2)); // Version major
        data.extend_from_slice(&u16_bytes(4)); // Version minor
        data.extend_from_slice(&u32_bytes(0)); // Thiszone
        data.extend_from_slice(&u32_bytes(0)); // Sigfigs
        data.extend_from_slice(&u32_bytes(self.snaplen));
        data.extend_from_slice(&u32_bytes(self.link_type));

        for record in &self.records {
            data.extend_from_slice(&u32_bytes(record.secs));
            data.extend_from_slice(&u32_bytes(record.micros));
            data.extend_from_slice(&u32_bytes(record.data.len() as u32));
            data.extend_from_slice(&u32_bytes(record.original_length));
            data.extend_from_slice(&record.data);
        }

        data
    }
}
