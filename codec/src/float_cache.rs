//! Adaptive float cache with back-references and delta coding.
//!
//! Every float goes through [`FloatCache::encode`] / [`FloatCache::decode`],
//! which write or read one `float_bits`-wide index field and then, depending
//! on the index:
//!
//! - `index < len`: an exact back-reference to a cached value;
//! - `index == len`: a new value as `base index` + zigzag varint delta of the
//!   bit patterns;
//! - `index == len + 1`: a new value as its raw 32-bit pattern, little-endian.
//!
//! Both sides push the resulting value afterwards, so the encoder's and the
//! decoder's caches stay identical after every float.

use std::mem::size_of;
use std::ops::RangeInclusive;

use bitstream::{BitReader, BitWriter};
use wire::{read_varint, write_varint, zigzag_decode, zigzag_encode, EncodeError, StreamHeader};

use crate::error::{CodecError, CodecResult};
use crate::ring::RingBuffer;

/// Bit-pattern differences eligible for delta coding.
const DELTA_WINDOW: RangeInclusive<i64> = -0x2_0000..=0x1_FFFF;

/// Index values reserved for the two "new value" sentinels.
const SENTINELS: usize = 2;

/// How a float was coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatPath {
    /// Back-reference to the cached entry at `index`.
    Exact { index: usize },
    /// Delta from the cached entry at `base`.
    Delta { base: usize, delta: i32 },
    /// Raw 32-bit pattern.
    Literal,
}

/// A cached float with the bit pattern it was coded from.
///
/// The pattern is kept alongside the value so deltas never depend on
/// re-casting (NaN payloads and signed zeros stay exact).
#[derive(Debug, Clone, Copy, Default)]
struct CacheEntry {
    value: f32,
    image: u32,
}

impl CacheEntry {
    fn from_value(value: f32) -> Self {
        Self {
            value,
            image: value.to_bits(),
        }
    }

    fn from_image(image: u32) -> Self {
        Self {
            value: f32::from_bits(image),
            image,
        }
    }
}

/// Per-stream cache of recently coded floats.
#[derive(Debug, Clone)]
pub struct FloatCache {
    entries: RingBuffer<CacheEntry>,
    float_bits: u8,
}

impl FloatCache {
    /// Allocates a cache with `2^float_bits` slots.
    pub fn new(float_bits: u8) -> CodecResult<Self> {
        if !StreamHeader::float_bits_valid(float_bits) {
            return Err(EncodeError::FloatBitsOutOfRange { found: float_bits }.into());
        }
        let capacity = StreamHeader::new(float_bits).float_capacity();
        let entries = RingBuffer::try_new(capacity, capacity - SENTINELS).map_err(|_| {
            CodecError::AllocationFailed {
                bytes: capacity * size_of::<CacheEntry>(),
            }
        })?;
        Ok(Self {
            entries,
            float_bits,
        })
    }

    /// Width of every index field.
    #[must_use]
    pub const fn float_bits(&self) -> u8 {
        self.float_bits
    }

    /// Number of live entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Maximum number of live entries (`2^float_bits - 2`).
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.entries.capacity() - SENTINELS
    }

    /// Returns the cached value at head-relative `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.entries.get(index).map(|entry| entry.value)
    }

    /// Writes `value` and records it in the cache.
    pub fn encode(&mut self, writer: &mut BitWriter, value: f32) -> CodecResult<FloatPath> {
        let entry = CacheEntry::from_value(value);
        let len = self.entries.len();
        let exact = self.entries.iter().position(|e| e.image == entry.image);

        let path = if let Some(index) = exact {
            self.write_index(writer, index)?;
            self.entries.promote(index);
            FloatPath::Exact { index }
        } else if let Some((base, delta)) = self.nearby(entry.image) {
            self.write_index(writer, len)?;
            self.write_index(writer, base)?;
            write_varint(writer, zigzag_encode(delta))?;
            FloatPath::Delta { base, delta }
        } else {
            self.write_index(writer, len + 1)?;
            for byte in entry.image.to_le_bytes() {
                writer.write_byte(byte);
            }
            FloatPath::Literal
        };

        self.entries.push(entry);
        Ok(path)
    }

    /// Reads one float and records it in the cache.
    pub fn decode(&mut self, reader: &mut BitReader<'_>) -> CodecResult<(f32, FloatPath)> {
        let len = self.entries.len();
        let index = self.read_index(reader)?;

        let (entry, path) = if index < len {
            let entry = self.cached(index)?;
            self.entries.promote(index);
            (entry, FloatPath::Exact { index })
        } else if index == len {
            let base = self.read_index(reader)?;
            let cached = self.cached(base)?;
            let delta = zigzag_decode(read_varint(reader)?);
            let image = u32::try_from(i64::from(cached.image) + i64::from(delta)).map_err(|_| {
                CodecError::FloatDeltaOutOfRange {
                    base: cached.image,
                    delta,
                }
            })?;
            (CacheEntry::from_image(image), FloatPath::Delta { base, delta })
        } else if index == len + 1 {
            let mut bytes = [0u8; 4];
            for byte in &mut bytes {
                *byte = reader.read_byte()?;
            }
            (
                CacheEntry::from_image(u32::from_le_bytes(bytes)),
                FloatPath::Literal,
            )
        } else {
            return Err(CodecError::FloatIndexOutOfRange { index, len });
        };

        self.entries.push(entry);
        Ok((entry.value, path))
    }

    /// First cached entry, newest first, whose pattern lies within the delta window.
    ///
    /// This stops at the first candidate rather than the closest one; streams
    /// depend on that choice, so changing it breaks compatibility.
    fn nearby(&self, image: u32) -> Option<(usize, i32)> {
        self.entries.iter().enumerate().find_map(|(index, cached)| {
            let delta = i64::from(image) - i64::from(cached.image);
            if DELTA_WINDOW.contains(&delta) {
                i32::try_from(delta).ok().map(|delta| (index, delta))
            } else {
                None
            }
        })
    }

    fn cached(&self, index: usize) -> CodecResult<CacheEntry> {
        self.entries
            .get(index)
            .copied()
            .ok_or(CodecError::FloatIndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    fn write_index(&self, writer: &mut BitWriter, index: usize) -> CodecResult<()> {
        writer.write_bits(index as u64, self.float_bits)?;
        Ok(())
    }

    fn read_index(&self, reader: &mut BitReader<'_>) -> CodecResult<usize> {
        // float_bits <= 16, so the field always fits in usize.
        Ok(reader.read_bits(self.float_bits)? as usize)
    }
}
