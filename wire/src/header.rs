//! Stream header types and constants.

use crate::error::{DecodeError, EncodeError, WireResult};

/// Signature identifying objz streams.
///
/// This value is fixed and must never change across versions.
pub const MAGIC: [u8; 4] = *b"OBJZ";

/// Current stream format version.
pub const VERSION: u8 = 0;

/// Reserved padding bytes checked as a lightweight sanity marker.
pub const PADDING: [u8; 2] = *b"LS";

/// Header size in bytes (8 total).
pub const HEADER_SIZE: usize = 4 + 1 + 1 + 2;

/// Smallest accepted `float_bits` (cache capacity 8).
pub const MIN_FLOAT_BITS: u8 = 3;

/// Largest accepted `float_bits` (cache capacity 65536).
pub const MAX_FLOAT_BITS: u8 = 16;

/// `float_bits` used when the caller does not choose one.
pub const DEFAULT_FLOAT_BITS: u8 = 8;

/// Stream header.
///
/// The signature and padding are validated during decoding and are not
/// stored in this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    /// Format version.
    pub version: u8,
    /// Log2 of the float cache capacity.
    pub float_bits: u8,
}

impl StreamHeader {
    /// Creates a current-version header.
    #[must_use]
    pub const fn new(float_bits: u8) -> Self {
        Self {
            version: VERSION,
            float_bits,
        }
    }

    /// Returns `true` if `float_bits` lies within `[MIN_FLOAT_BITS, MAX_FLOAT_BITS]`.
    #[must_use]
    pub const fn float_bits_valid(float_bits: u8) -> bool {
        float_bits >= MIN_FLOAT_BITS && float_bits <= MAX_FLOAT_BITS
    }

    /// Number of slots in the float cache ring buffer.
    #[must_use]
    pub const fn float_capacity(self) -> usize {
        1usize << self.float_bits
    }
}

impl Default for StreamHeader {
    fn default() -> Self {
        Self::new(DEFAULT_FLOAT_BITS)
    }
}

/// Encodes a header into `out`, returning the number of bytes written.
pub fn encode_header(header: &StreamHeader, out: &mut [u8]) -> Result<usize, EncodeError> {
    if out.len() < HEADER_SIZE {
        return Err(EncodeError::BufferTooSmall {
            needed: HEADER_SIZE,
            available: out.len(),
        });
    }
    if !StreamHeader::float_bits_valid(header.float_bits) {
        return Err(EncodeError::FloatBitsOutOfRange {
            found: header.float_bits,
        });
    }

    out[0..4].copy_from_slice(&MAGIC);
    out[4] = header.version;
    out[5] = header.float_bits;
    out[6..8].copy_from_slice(&PADDING);
    Ok(HEADER_SIZE)
}

/// Decodes and validates the header at the start of `buf`.
pub fn decode_header(buf: &[u8]) -> WireResult<StreamHeader> {
    if buf.len() < HEADER_SIZE {
        return Err(DecodeError::StreamTooSmall {
            actual: buf.len(),
            required: HEADER_SIZE,
        });
    }

    let magic = [buf[0], buf[1], buf[2], buf[3]];
    if magic != MAGIC {
        return Err(DecodeError::InvalidMagic { found: magic });
    }

    let version = buf[4];
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }

    let padding = [buf[6], buf[7]];
    if padding != PADDING {
        return Err(DecodeError::InvalidPadding { found: padding });
    }

    let float_bits = buf[5];
    if !StreamHeader::float_bits_valid(float_bits) {
        return Err(DecodeError::FloatBitsOutOfRange { found: float_bits });
    }

    Ok(StreamHeader {
        version,
        float_bits,
    })
}
