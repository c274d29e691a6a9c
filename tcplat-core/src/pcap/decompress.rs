//! Transparent decompression of capture files.

use std::io::{self, BufRead, Read};

use super::header::GZIP_MAGIC;
#[cfg(feature = "compress-zstd")]
use super::header::ZSTD_MAGIC;

/// Compression wrapping a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    #[cfg(feature = "compress-zstd")]
    Zstd,
}

impl Compression {
    /// Detect compression from the leading bytes of a file.
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(&GZIP_MAGIC) {
            return Compression::Gzip;
        }
        #[cfg(feature = "compress-zstd")]
        if data.starts_with(&ZSTD_MAGIC) {
            return Compression::Zstd;
        }
        Compression::None
    }

    pub fn is_compressed(&self) -> bool {
        !matches!(self, Compression::None)
    }

    /// Wrap `reader` in the matching decoder.
    pub fn decoder<R>(self, reader: R) -> io::Result<Box<dyn Read + Send>>
    where
        R: BufRead + Send + 'static,
    {
        Ok(match self {
            Compression::None => Box::new(reader),
            // Multi-member aware: `cat a.gz b.gz` style files decode fully.
            Compression::Gzip => Box::new(flate2::bufread::MultiGzDecoder::new(reader)),
            #[cfg(feature = "compress-zstd")]
            Compression::Zstd => Box::new(zstd::Decoder::with_buffer(reader)?),
        })
    }
}
