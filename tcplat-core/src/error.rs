//! Error types for tcplat-core.
//!
//! - [`enum@Error`] - Main error enum returned by the reader and pipeline
//! - [`FormatError`] - Fatal capture-file format errors
//! - [`FilterError`] - Invalid byte filter expressions
//!
//! Packets that are not IPv4/TCP, unmatched packets and negative latencies
//! are not errors; they flow through the pipeline as data.

use thiserror::Error;

use crate::correlate::Origin;

/// Main error type for tcplat-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The capture file is malformed
    #[error("Capture format error: {0}")]
    Format(#[from] FormatError),

    /// An error raised while reading one of the two captures
    #[error("{origin} capture: {source}")]
    Capture {
        origin: Origin,
        #[source]
        source: Box<Error>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attribute this error to one of the two captures.
    pub(crate) fn in_capture(self, origin: Origin) -> Self {
        match self {
            already @ Error::Capture { .. } => already,
            other => Error::Capture {
                origin,
                source: Box::new(other),
            },
        }
    }

    /// The capture this error was raised for, if known.
    pub fn origin(&self) -> Option<Origin> {
        match self {
            Error::Capture { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    /// The underlying format error, looking through capture attribution.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            Error::Format(e) => Some(e),
            Error::Capture { source, .. } => source.format_error(),
            Error::Io(_) => None,
        }
    }
}

/// Fatal errors in the legacy capture file layout.
///
/// Any of these aborts reading the file: once a record boundary is lost,
/// every following record would be misread.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Leading magic number is not a legacy capture signature
    #[error("Unknown magic number: 0x{magic:08x}")]
    BadMagic { magic: u32 },

    /// Recognized, but unsupported, container or timestamp variant
    #[error("Unsupported capture format: {format}")]
    UnsupportedFormat { format: &'static str },

    /// Input ended inside the 24-byte global header
    #[error("Truncated global header: need {needed} bytes, have {available}")]
    TruncatedHeader { needed: usize, available: usize },

    /// Global header could not be decoded
    #[error("Invalid global header: {reason}")]
    InvalidHeader { reason: String },

    /// A record header or record body could not be decoded
    #[error("Malformed record at frame {frame} (byte offset {offset}): {reason}")]
    MalformedRecord {
        frame: u64,
        offset: u64,
        reason: String,
    },
}

/// Errors parsing `OFFSET:VALUE` byte filter expressions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("expected OFFSET:VALUE, got {0:?}")]
    MissingSeparator(String),

    #[error("invalid byte offset {0:?}")]
    InvalidOffset(String),

    #[error("invalid byte value {0:?} (expected 0-255)")]
    InvalidValue(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
