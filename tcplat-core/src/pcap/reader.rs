//! Legacy PCAP reader over any `Read` source.
//!
//! The global header is decoded up front so the byte order is known and
//! unsupported variants are rejected before any record is read. Record
//! framing is delegated to `pcap_parser`, which applies the same byte order
//! to every record header.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read};
use std::path::Path;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned};
use tracing::{debug, trace, warn};

use super::decompress::Compression;
use super::header::{GlobalHeader, GLOBAL_HEADER_LEN, RECORD_HEADER_LEN};
use super::RawPacket;
use crate::error::{Error, FormatError};
use crate::timestamp::CaptureTimestamp;

/// Initial buffer size for the record parser (1MB).
const BUFFER_SIZE: usize = 1 << 20;

/// Upper bound on the parser buffer, whatever the header's snap length says.
const MAX_BUFFER_SIZE: usize = 1 << 28;

/// Reader opened from a path, possibly decompressing.
pub type FileCaptureReader = CaptureReader<Box<dyn Read + Send>>;

/// Lazy, single-pass reader of legacy capture records.
pub struct CaptureReader<R: Read> {
    inner: LegacyPcapReader<StashErrors<Chain<Cursor<[u8; GLOBAL_HEADER_LEN]>, R>>>,
    header: GlobalHeader,
    read_error: ReadErrorSlot,
    buffer_size: usize,
    frame_number: u64,
    offset: u64,
}

type ReadErrorSlot = Arc<Mutex<Option<io::Error>>>;

/// Keeps the first I/O error of the source, which `pcap_parser` reports only
/// as `PcapError::ReadError`.
struct StashErrors<R> {
    source: R,
    slot: ReadErrorSlot,
}

impl<R: Read> Read for StashErrors<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.source.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let kind = e.kind();
                    if let Ok(mut slot) = self.slot.lock() {
                        slot.get_or_insert(e);
                    }
                    return Err(kind.into());
                }
                ok => return ok,
            }
        }
    }
}

impl FileCaptureReader {
    /// Open a capture file for reading.
    ///
    /// Gzip-compressed files (and zstd with the `compress-zstd` feature)
    /// are detected by magic bytes and decompressed on the fly.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let mut buffered = BufReader::with_capacity(64 * 1024, file);
        let compression = Compression::detect(buffered.fill_buf()?);
        debug!(path = %path.display(), ?compression, "opening capture");

        CaptureReader::new(compression.decoder(buffered)?)
    }
}

impl<R: Read> CaptureReader<R> {
    /// Create a reader over an uncompressed legacy capture stream.
    pub fn new(mut source: R) -> Result<Self, Error> {
        let mut raw = [0u8; GLOBAL_HEADER_LEN];
        let filled = read_up_to(&mut source, &mut raw)?;
        let header = GlobalHeader::parse(&raw[..filled])?;

        if header.version_major != 2 {
            warn!(
                version_major = header.version_major,
                version_minor = header.version_minor,
                "unexpected PCAP version, reading anyway"
            );
        }

        // Hand the already-consumed header back in front of the stream.
        let read_error = ReadErrorSlot::default();
        let stream = StashErrors {
            source: Cursor::new(raw).chain(source),
            slot: Arc::clone(&read_error),
        };
        let inner = match LegacyPcapReader::new(BUFFER_SIZE, stream) {
            Ok(inner) => inner,
            Err(pcap_parser::PcapError::ReadError) => return Err(take_read_error(&read_error)),
            Err(e) => {
                return Err(FormatError::InvalidHeader {
                    reason: e.to_string(),
                }
                .into())
            }
        };

        debug!(
            byte_order = ?header.byte_order,
            snaplen = header.snaplen,
            link_type = header.link_type(),
            "decoded capture header"
        );

        Ok(Self {
            inner,
            header,
            read_error,
            buffer_size: BUFFER_SIZE,
            frame_number: 0,
            offset: 0,
        })
    }

    /// The decoded global header.
    pub fn header(&self) -> &GlobalHeader {
        &self.header
    }

    /// Get the link type of the capture (e.g., 1 = Ethernet).
    #[inline]
    pub fn link_type(&self) -> u16 {
        self.header.link_type()
    }

    /// Get the current frame count.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_number
    }

    /// Bytes consumed so far, i.e. the offset of the next record.
    #[inline]
    pub fn byte_offset(&self) -> u64 {
        self.offset
    }

    /// Read the next packet.
    ///
    /// Returns `Ok(None)` when input ends on a record boundary.
    pub fn next_packet(&mut self) -> Result<Option<RawPacket>, Error> {
        use pcap_parser::PcapError as PcapParserError;

        loop {
            match self.inner.next() {
                Ok((consumed, block)) => match block {
                    PcapBlockOwned::Legacy(record) => {
                        self.frame_number += 1;

                        let packet = RawPacket {
                            frame_number: self.frame_number,
                            timestamp: CaptureTimestamp::new(record.ts_sec, record.ts_usec),
                            captured_length: record.caplen,
                            original_length: record.origlen,
                            link_type: self.header.link_type(),
                            data: Bytes::copy_from_slice(record.data),
                        };

                        self.inner.consume(consumed);
                        self.offset += consumed as u64;
                        return Ok(Some(packet));
                    }
                    // Header already decoded in new()
                    _ => {
                        self.inner.consume(consumed);
                        self.offset += consumed as u64;
                        continue;
                    }
                },
                Err(PcapParserError::Eof) => return Ok(None),
                Err(PcapParserError::Incomplete(_)) => {
                    let (frame, offset) = (self.frame_number + 1, self.offset);
                    if let Err(e) = self.inner.refill() {
                        return Err(match e {
                            PcapParserError::ReadError => take_read_error(&self.read_error),
                            e => malformed(frame, offset, format!("refill error: {e}")),
                        });
                    }
                    continue;
                }
                Err(PcapParserError::BufferTooSmall) => {
                    let limit = max_buffer_size(self.header.snaplen);
                    if self.buffer_size >= limit {
                        return Err(malformed(
                            self.frame_number + 1,
                            self.offset,
                            format!(
                                "record does not fit in {limit} bytes (snap length {})",
                                self.header.snaplen
                            ),
                        ));
                    }
                    self.buffer_size = (self.buffer_size * 2).min(limit);
                    trace!(buffer_size = self.buffer_size, "growing record buffer");
                    self.inner.grow(self.buffer_size);
                    continue;
                }
                Err(PcapParserError::UnexpectedEof) => {
                    let reason = "record truncated at end of input".to_string();
                    return Err(malformed(self.frame_number + 1, self.offset, reason));
                }
                Err(e) => {
                    let reason = e.to_string();
                    return Err(malformed(self.frame_number + 1, self.offset, reason));
                }
            }
        }
    }
}

/// A record must fit the parser buffer whole, so the bound follows the snap
/// length.
fn max_buffer_size(snaplen: u32) -> usize {
    (snaplen as usize)
        .saturating_add(RECORD_HEADER_LEN + 1)
        .checked_next_power_of_two()
        .unwrap_or(MAX_BUFFER_SIZE)
        .clamp(BUFFER_SIZE, MAX_BUFFER_SIZE)
}

fn malformed(frame: u64, offset: u64, reason: String) -> Error {
    Error::Format(FormatError::MalformedRecord {
        frame,
        offset,
        reason,
    })
}

fn take_read_error(slot: &ReadErrorSlot) -> Error {
    let stashed = slot.lock().ok().and_then(|mut slot| slot.take());
    Error::Io(stashed.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "read error")))
}

/// Fill `buf` as far as the source allows, returning the byte count.
fn read_up_to<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Iterator adapter for CaptureReader.
impl<R: Read> Iterator for CaptureReader<R> {
    type Item = Result<RawPacket, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
