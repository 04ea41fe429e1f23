//! Error types for codec operations.

use std::fmt;
use std::io;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Boxed error raised by a [`MeshSink`](crate::MeshSink) implementation.
pub type SinkError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while encoding or decoding a mesh stream.
#[derive(Debug)]
#[non_exhaustive]
pub enum CodecError {
    /// Wire format error (header, event code, varint, limits).
    Wire(wire::DecodeError),

    /// Wire encoding error.
    Encode(wire::EncodeError),

    /// Bitstream error.
    Bitstream(bitstream::BitError),

    /// Underlying sink or source failed.
    Io(io::Error),

    /// Operation requires an open stream.
    NotOpen,

    /// `open` called on a stream that is already open.
    AlreadyOpen,

    /// Float cache buffers could not be allocated.
    AllocationFailed { bytes: usize },

    /// Float cache index beyond the live entries and sentinels.
    FloatIndexOutOfRange { index: usize, len: usize },

    /// Delta-coded float reconstructs to an image outside `u32`.
    FloatDeltaOutOfRange { base: u32, delta: i32 },

    /// Texture coordinate or normal indices do not match the vertex count.
    IndexCountMismatch {
        table: IndexTable,
        expected: usize,
        actual: usize,
    },

    /// Element has more indices than a count field can carry.
    ElementTooLarge { count: usize },

    /// Encoder input exceeds the configured limits.
    LimitsExceeded {
        kind: wire::LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Object name is too long to encode.
    NameTooLong { bytes: usize },

    /// Object name is not valid UTF-8.
    InvalidObjectName,

    /// Bytes remain after the end-of-stream event.
    TrailingData { bytes: usize },

    /// The consumer rejected an event.
    Sink(SinkError),
}

/// Per-vertex index table named in [`CodecError::IndexCountMismatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTable {
    TexCoords,
    Normals,
}

impl CodecError {
    /// Wraps a consumer error.
    pub fn sink<E>(err: E) -> Self
    where
        E: Into<SinkError>,
    {
        Self::Sink(err.into())
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::Encode(e) => write!(f, "encode error: {e}"),
            Self::Bitstream(e) => write!(f, "bitstream error: {e}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::NotOpen => write!(f, "stream is not open"),
            Self::AlreadyOpen => write!(f, "stream is already open"),
            Self::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {bytes} bytes for the float cache")
            }
            Self::FloatIndexOutOfRange { index, len } => {
                write!(f, "float cache index {index} out of range for {len} entries")
            }
            Self::FloatDeltaOutOfRange { base, delta } => {
                write!(f, "float delta {delta} from image 0x{base:08X} overflows")
            }
            Self::IndexCountMismatch {
                table,
                expected,
                actual,
            } => {
                write!(f, "expected {expected} {table} indices, got {actual}")
            }
            Self::ElementTooLarge { count } => {
                write!(f, "element with {count} indices is too large")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => write!(f, "{kind} limit exceeded: {actual} > {limit}"),
            Self::NameTooLong { bytes } => {
                write!(f, "object name of {bytes} bytes is too long")
            }
            Self::InvalidObjectName => write!(f, "object name is not valid UTF-8"),
            Self::TrailingData { bytes } => {
                write!(f, "{bytes} bytes of trailing data after end of stream")
            }
            Self::Sink(e) => write!(f, "sink error: {e}"),
        }
    }
}

impl fmt::Display for IndexTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TexCoords => "texture coordinate",
            Self::Normals => "normal",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Bitstream(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Sink(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<wire::DecodeError> for CodecError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Wire(err)
    }
}

impl From<wire::EncodeError> for CodecError {
    fn from(err: wire::EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl From<bitstream::BitError> for CodecError {
    fn from(err: bitstream::BitError) -> Self {
        Self::Bitstream(err)
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
