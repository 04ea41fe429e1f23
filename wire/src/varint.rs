//! Variable-length integer encodings.
//!
//! Two schemes share the stream:
//!
//! - the general varint: 7-bit chunks, 6 payload bits plus a continuation
//!   flag in bit 6, least-significant chunk first. Used for name lengths and
//!   float deltas.
//! - the escalating `icount` varint: chunk `k` carries `3 + 2k` payload bits
//!   followed by a continuation bit. Used for element counts and index
//!   deltas, where values up to 7 cost only four bits.
//!
//! Signed values go through [`zigzag_encode`] first.

use bitstream::{BitReader, BitWriter};

use crate::error::{DecodeError, EncodeError, WireResult};

const VARINT_PAYLOAD_BITS: u32 = 6;
const VARINT_CONTINUE: u64 = 1 << VARINT_PAYLOAD_BITS;
const VARINT_MAX_CHUNKS: u32 = 6;

const ICOUNT_FIRST_WIDTH: u8 = 3;
const ICOUNT_WIDTH_STEP: u8 = 2;
const ICOUNT_MAX_CHUNKS: usize = 5;

/// Maps a signed integer onto an unsigned one, keeping small magnitudes small.
#[must_use]
pub const fn zigzag_encode(value: i32) -> u32 {
    ((value >> 31) ^ (value << 1)) as u32
}

/// Inverse of [`zigzag_encode`].
#[must_use]
pub const fn zigzag_decode(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Writes a general varint.
pub fn write_varint(writer: &mut BitWriter, value: u32) -> Result<(), EncodeError> {
    let mut rest = u64::from(value);
    loop {
        let payload = rest & (VARINT_CONTINUE - 1);
        rest >>= VARINT_PAYLOAD_BITS;
        let chunk = if rest == 0 {
            payload
        } else {
            payload | VARINT_CONTINUE
        };
        writer.write_bits(chunk, 7)?;
        if rest == 0 {
            return Ok(());
        }
    }
}

/// Reads a general varint.
pub fn read_varint(reader: &mut BitReader<'_>) -> WireResult<u32> {
    let mut value = 0u64;
    for chunk in 0..VARINT_MAX_CHUNKS {
        let raw = reader.read_bits(7)?;
        value |= (raw & (VARINT_CONTINUE - 1)) << (chunk * VARINT_PAYLOAD_BITS);
        if raw & VARINT_CONTINUE == 0 {
            return u32::try_from(value).map_err(|_| DecodeError::InvalidVarint);
        }
    }
    Err(DecodeError::InvalidVarint)
}

/// Number of bits [`write_varint`] spends on `value`.
#[must_use]
pub const fn varint_bits(value: u32) -> usize {
    let mut chunks = 1;
    let mut rest = value >> VARINT_PAYLOAD_BITS;
    while rest != 0 {
        chunks += 1;
        rest >>= VARINT_PAYLOAD_BITS;
    }
    chunks * 7
}

/// Writes an escalating-width `icount` varint.
pub fn write_icount(writer: &mut BitWriter, value: u32) -> Result<(), EncodeError> {
    let mut rest = u64::from(value);
    let mut width = ICOUNT_FIRST_WIDTH;
    loop {
        let payload = rest & ((1u64 << width) - 1);
        rest >>= width;
        let more = rest != 0;
        writer.write_bits((payload << 1) | u64::from(more), width + 1)?;
        if !more {
            return Ok(());
        }
        width += ICOUNT_WIDTH_STEP;
    }
}

/// Reads an escalating-width `icount` varint.
pub fn read_icount(reader: &mut BitReader<'_>) -> WireResult<u32> {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut width = ICOUNT_FIRST_WIDTH;
    for _ in 0..ICOUNT_MAX_CHUNKS {
        let raw = reader.read_bits(width + 1)?;
        value |= (raw >> 1) << shift;
        if raw & 1 == 0 {
            return u32::try_from(value).map_err(|_| DecodeError::InvalidVarint);
        }
        shift += u32::from(width);
        width += ICOUNT_WIDTH_STEP;
    }
    Err(DecodeError::InvalidVarint)
}

/// Number of bits [`write_icount`] spends on `value`.
#[must_use]
pub const fn icount_bits(value: u32) -> usize {
    let mut total = 0usize;
    let mut rest = value as u64;
    let mut width = ICOUNT_FIRST_WIDTH;
    loop {
        total += width as usize + 1;
        rest >>= width;
        if rest == 0 {
            return total;
        }
        width += ICOUNT_WIDTH_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint_bytes(value: u32) -> (Vec<u8>, usize) {
        let mut writer = BitWriter::new();
        write_varint(&mut writer, value).unwrap();
        let bits = writer.bits_written();
        (writer.finish(), bits)
    }

    fn icount_bytes(value: u32) -> (Vec<u8>, usize) {
        let mut writer = BitWriter::new();
        write_icount(&mut writer, value).unwrap();
        let bits = writer.bits_written();
        (writer.finish(), bits)
    }

    #[test]
    fn zigzag_small_values() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        assert_eq!(zigzag_encode(i32::MAX), u32::MAX - 1);
        assert_eq!(zigzag_encode(i32::MIN), u32::MAX);
    }

    #[test]
    fn zigzag_inverse_at_extremes() {
        for value in [0, 1, -1, 63, -64, i32::MAX, i32::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(value)), value);
        }
    }

    #[test]
    fn varint_single_chunk() {
        let (bytes, bits) = varint_bytes(63);
        assert_eq!(bits, 7);
        // 0 | 111111, padded
        assert_eq!(bytes, vec![0b0111_1110]);
    }

    #[test]
    fn varint_two_chunks_low_first() {
        // 64 = payload 0 with continuation, then payload 1.
        let (bytes, bits) = varint_bytes(64);
        assert_eq!(bits, 14);
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(7).unwrap(), 0b100_0000);
        assert_eq!(reader.read_bits(7).unwrap(), 0b000_0001);
    }

    #[test]
    fn varint_bits_matches_writer() {
        for value in [0, 1, 63, 64, 4095, 4096, 0x3_FFFF, u32::MAX] {
            assert_eq!(varint_bytes(value).1, varint_bits(value), "{value}");
        }
        assert_eq!(varint_bits(u32::MAX), 42);
    }

    #[test]
    fn varint_rejects_overlong() {
        let mut writer = BitWriter::new();
        for _ in 0..7 {
            writer.write_bits(0x7F, 7).unwrap();
        }
        let bytes = writer.finish();
        assert_eq!(
            read_varint(&mut BitReader::new(&bytes)),
            Err(DecodeError::InvalidVarint)
        );
    }

    #[test]
    fn varint_rejects_overflow() {
        let mut writer = BitWriter::new();
        for _ in 0..5 {
            writer.write_bits(0x7F, 7).unwrap();
        }
        // Sixth chunk payload needs more than the two remaining bits.
        writer.write_bits(0b000_0100, 7).unwrap();
        let bytes = writer.finish();
        assert_eq!(
            read_varint(&mut BitReader::new(&bytes)),
            Err(DecodeError::InvalidVarint)
        );
    }

    #[test]
    fn varint_truncated() {
        let mut writer = BitWriter::new();
        writer.write_bits(0x7F, 7).unwrap();
        let bytes = writer.finish();
        assert!(matches!(
            read_varint(&mut BitReader::new(&bytes)),
            Err(DecodeError::Bitstream(_))
        ));
    }

    #[test]
    fn icount_small_values_cost_four_bits() {
        for value in 0..=7 {
            let (bytes, bits) = icount_bytes(value);
            assert_eq!(bits, 4);
            assert_eq!(read_icount(&mut BitReader::new(&bytes)).unwrap(), value);
        }
    }

    #[test]
    fn icount_chunk_layout() {
        // 8 = 0b1_000: first chunk payload 000 + continue, second chunk payload 00001 + stop.
        let (bytes, bits) = icount_bytes(8);
        assert_eq!(bits, 4 + 6);
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(4).unwrap(), 0b000_1);
        assert_eq!(reader.read_bits(6).unwrap(), 0b00001_0);
    }

    #[test]
    fn icount_widths_escalate() {
        assert_eq!(icount_bits(7), 4);
        assert_eq!(icount_bits(8), 10);
        assert_eq!(icount_bits(255), 10);
        assert_eq!(icount_bits(256), 18);
        assert_eq!(icount_bits(u32::MAX), 4 + 6 + 8 + 10 + 12);
    }

    #[test]
    fn icount_roundtrip_boundaries() {
        for value in [0, 7, 8, 255, 256, 32_767, 32_768, 16_777_215, 16_777_216, u32::MAX] {
            let (bytes, bits) = icount_bytes(value);
            assert_eq!(bits, icount_bits(value));
            assert_eq!(read_icount(&mut BitReader::new(&bytes)).unwrap(), value);
        }
    }

    #[test]
    fn icount_rejects_overflow() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b111_1, 4).unwrap();
        writer.write_bits(0b11111_1, 6).unwrap();
        writer.write_bits(0b1111111_1, 8).unwrap();
        writer.write_bits(0b111111111_1, 10).unwrap();
        // Fifth chunk carries bits 24..35; anything above bit 31 overflows.
        writer.write_bits(0b11111111111_0, 12).unwrap();
        let bytes = writer.finish();
        assert_eq!(
            read_icount(&mut BitReader::new(&bytes)),
            Err(DecodeError::InvalidVarint)
        );
    }

    #[test]
    fn icount_rejects_overlong() {
        let mut writer = BitWriter::new();
        let mut width = 3u8;
        for _ in 0..6 {
            writer.write_bits(1, width + 1).unwrap();
            width += 2;
        }
        let bytes = writer.finish();
        assert_eq!(
            read_icount(&mut BitReader::new(&bytes)),
            Err(DecodeError::InvalidVarint)
        );
    }
}
