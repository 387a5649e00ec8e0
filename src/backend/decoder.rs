//! Fixed-width positional frame decoding
//!
//! A frame is `num_channels × width` bytes with no header, delimiter or
//! checksum. Channel `i` occupies bytes `[i*width, (i+1)*width)`, encoded
//! little-endian. Decoding is all-or-nothing: a frame of the wrong length is
//! rejected before any value is produced.

use crate::types::{SampleValue, SampleWidth};
use thiserror::Error;

/// Errors produced while decoding or encoding raw frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameDecodeError {
    #[error("frame length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("unsupported sample width: {0} bytes (expected 2 or 4)")]
    UnsupportedWidth(u8),

    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    #[error("channel {channel} has width {actual}, frame width is {expected}")]
    WidthMismatch {
        channel: usize,
        expected: SampleWidth,
        actual: SampleWidth,
    },
}

/// Decodes raw frames into per-channel values using one configured width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDecoder {
    width: SampleWidth,
    num_channels: usize,
}

impl FrameDecoder {
    /// Create a decoder from a raw byte width.
    ///
    /// Fails with [`FrameDecodeError::UnsupportedWidth`] unless `width_bytes`
    /// is 2 or 4.
    pub fn new(width_bytes: u8, num_channels: usize) -> Result<Self, FrameDecodeError> {
        let width = SampleWidth::try_from(width_bytes)?;
        Ok(Self::with_width(width, num_channels))
    }

    /// Create a decoder from an already validated width
    pub fn with_width(width: SampleWidth, num_channels: usize) -> Self {
        Self {
            width,
            num_channels,
        }
    }

    pub fn width(&self) -> SampleWidth {
        self.width
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Exact byte length of one frame
    pub fn frame_len(&self) -> usize {
        self.num_channels * self.width.size_bytes()
    }

    /// Decode a frame into a fresh vector, one value per channel
    pub fn decode(&self, raw: &[u8]) -> Result<Vec<SampleValue>, FrameDecodeError> {
        let mut values = Vec::with_capacity(self.num_channels);
        self.decode_into(raw, &mut values)?;
        Ok(values)
    }

    /// Decode a frame into `out`, replacing its contents.
    ///
    /// On error `out` is left untouched.
    pub fn decode_into(
        &self,
        raw: &[u8],
        out: &mut Vec<SampleValue>,
    ) -> Result<(), FrameDecodeError> {
        let expected = self.frame_len();
        if raw.len() != expected {
            return Err(FrameDecodeError::LengthMismatch {
                expected,
                actual: raw.len(),
            });
        }

        out.clear();
        let width = self.width.size_bytes();
        out.extend(raw.chunks_exact(width).map(|chunk| match self.width {
            SampleWidth::I16 => SampleValue::Int(i16::from_le_bytes([chunk[0], chunk[1]])),
            SampleWidth::F32 => {
                SampleValue::Float(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            }
        }));
        Ok(())
    }

    /// Encode one value per channel into a frame
    pub fn encode(&self, values: &[SampleValue]) -> Result<Vec<u8>, FrameDecodeError> {
        if values.len() != self.num_channels {
            return Err(FrameDecodeError::ChannelCountMismatch {
                expected: self.num_channels,
                actual: values.len(),
            });
        }

        let mut raw = Vec::with_capacity(self.frame_len());
        for (channel, value) in values.iter().enumerate() {
            match (self.width, value) {
                (SampleWidth::I16, SampleValue::Int(v)) => raw.extend_from_slice(&v.to_le_bytes()),
                (SampleWidth::F32, SampleValue::Float(v)) => {
                    raw.extend_from_slice(&v.to_le_bytes())
                }
                _ => {
                    return Err(FrameDecodeError::WidthMismatch {
                        channel,
                        expected: self.width,
                        actual: value.width(),
                    })
                }
            }
        }
        Ok(raw)
    }
}
