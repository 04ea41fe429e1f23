//! Bit-level writer for encoding packed binary data.

use std::io::{self, Write};

use crate::error::{BitError, BitResult};

/// A bit-level writer for encoding packed binary data.
///
/// Bits are packed most-significant first. Completed bytes accumulate in an
/// internal buffer; call [`finish`](Self::finish) for the final byte buffer,
/// or [`drain_into`](Self::drain_into) to hand completed bytes to a sink while
/// the stream is still being written.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// The accumulated bytes.
    bytes: Vec<u8>,
    /// Current byte being written (not yet pushed to bytes).
    current_byte: u8,
    /// Number of bits written to `current_byte` (0-7).
    bit_count: u8,
    /// Bytes already handed to a sink by `drain_into`.
    drained: usize,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Returns the number of bits written so far, including drained bytes.
    #[must_use]
    pub fn bits_written(&self) -> usize {
        (self.drained + self.bytes.len()) * 8 + self.bit_count as usize
    }

    /// Returns the number of completed bytes not yet drained.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) {
        self.current_byte = (self.current_byte << 1) | u8::from(value);
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Writes up to 64 bits from an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(());
        }
        if bits < 64 && value >= (1u64 << bits) {
            return Err(BitError::ValueOutOfRange { value, bits });
        }

        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Writes an 8-bit field at any bit position.
    pub fn write_byte(&mut self, value: u8) {
        for i in (0..8).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// Pads with zero bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        while self.bit_count != 0 {
            self.write_bit(false);
        }
    }

    /// Writes every completed byte to `sink` and releases it from the buffer.
    ///
    /// The partially filled trailing byte stays in the writer. Returns the
    /// number of bytes written to the sink.
    pub fn drain_into<W: Write>(&mut self, sink: &mut W) -> io::Result<usize> {
        let count = self.bytes.len();
        if count == 0 {
            return Ok(0);
        }
        sink.write_all(&self.bytes)?;
        self.bytes.clear();
        self.drained += count;
        Ok(count)
    }

    /// Finishes writing and returns the undrained byte buffer.
    ///
    /// If the last byte is incomplete, it is padded with zeros on the right.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.bytes
    }
}
