//! Encoder configuration.

use wire::{EncodeError, Limits, StreamHeader, DEFAULT_FLOAT_BITS};

use crate::error::CodecResult;

/// Settings fixed for the lifetime of one encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncoderConfig {
    /// Width of every float cache index field. The cache holds
    /// `2^float_bits - 2` values.
    pub float_bits: u8,

    /// Names and index lists beyond these limits are rejected before any bits
    /// are written, so a decoder with the same limits accepts every stream.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub limits: Limits,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            float_bits: DEFAULT_FLOAT_BITS,
            limits: Limits::default(),
        }
    }
}

impl EncoderConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_float_bits(mut self, float_bits: u8) -> Self {
        self.float_bits = float_bits;
        self
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Checks the configuration without allocating anything.
    pub fn validate(&self) -> CodecResult<()> {
        if StreamHeader::float_bits_valid(self.float_bits) {
            Ok(())
        } else {
            Err(EncodeError::FloatBitsOutOfRange {
                found: self.float_bits,
            }
            .into())
        }
    }

    pub(crate) const fn header(&self) -> StreamHeader {
        StreamHeader::new(self.float_bits)
    }
}
