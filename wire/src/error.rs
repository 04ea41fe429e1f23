//! Error types for wire format operations.

use std::fmt;

use bitstream::BitError;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Decode errors for the stream header, event codes and integer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Stream is too small to contain the required header.
    StreamTooSmall { actual: usize, required: usize },

    /// Invalid signature at the start of the stream.
    InvalidMagic { found: [u8; 4] },

    /// Unsupported format version.
    UnsupportedVersion { found: u8 },

    /// Padding bytes do not carry the expected sanity marker.
    InvalidPadding { found: [u8; 2] },

    /// `float_bits` outside the supported range.
    FloatBitsOutOfRange { found: u8 },

    /// Event code prefix longer than any table group.
    UnknownEventCode { group: u8 },

    /// Varint is overlong or overflows `u32`.
    InvalidVarint,

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Underlying bit reader failed (usually a truncated stream).
    Bitstream(BitError),
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    StreamBytes,
    NameBytes,
    ElementIndices,
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    BufferTooSmall { needed: usize, available: usize },
    FloatBitsOutOfRange { found: u8 },
    Bitstream(BitError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamTooSmall { actual, required } => {
                write!(
                    f,
                    "stream too small: {actual} bytes, need at least {required}"
                )
            }
            Self::InvalidMagic { found } => {
                write!(
                    f,
                    "invalid signature: {:02X} {:02X} {:02X} {:02X}",
                    found[0], found[1], found[2], found[3]
                )
            }
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version: {found}")
            }
            Self::InvalidPadding { found } => {
                write!(f, "invalid header padding: {:02X} {:02X}", found[0], found[1])
            }
            Self::FloatBitsOutOfRange { found } => {
                write!(f, "float bits {found} outside supported range")
            }
            Self::UnknownEventCode { group } => {
                write!(f, "unknown event code in group {group}")
            }
            Self::InvalidVarint => write!(f, "invalid varint"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::Bitstream(err) => write!(f, "bitstream error: {err}"),
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StreamBytes => "stream bytes",
            Self::NameBytes => "object name bytes",
            Self::ElementIndices => "element indices",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall { needed, available } => {
                write!(f, "buffer too small: need {needed}, have {available}")
            }
            Self::FloatBitsOutOfRange { found } => {
                write!(f, "float bits {found} outside supported range")
            }
            Self::Bitstream(err) => write!(f, "bitstream error: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bitstream(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bitstream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BitError> for DecodeError {
    fn from(err: BitError) -> Self {
        Self::Bitstream(err)
    }
}

impl From<BitError> for EncodeError {
    fn from(err: BitError) -> Self {
        Self::Bitstream(err)
    }
}
