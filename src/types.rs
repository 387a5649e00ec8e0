//! Core data types for serial-scope
//!
//! This module contains the fundamental data structures shared by the
//! acquisition thread and its consumers.
//!
//! # Main Types
//!
//! - [`SampleWidth`] - The single configured width used for every channel
//! - [`SampleValue`] - A decoded channel value (16-bit integer or 32-bit float)
//! - [`AcquisitionState`] - Lifecycle state of the acquisition loop
//! - [`AcquisitionStats`] - Counters reported when the loop stops
//!
//! # Sample Widths
//!
//! Frames carry no type information. The interpretation of every channel is
//! fixed by one configured width for the lifetime of the pipeline:
//! - 2 bytes: little-endian `i16`
//! - 4 bytes: little-endian IEEE-754 `f32`

use crate::backend::decoder::FrameDecodeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Byte width of one channel value within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleWidth {
    /// 16-bit signed integer
    I16,
    /// 32-bit floating point
    F32,
}

impl SampleWidth {
    /// Returns the size in bytes of one value
    pub fn size_bytes(&self) -> usize {
        match self {
            SampleWidth::I16 => 2,
            SampleWidth::F32 => 4,
        }
    }

    /// The neutral value used to pre-fill channel histories
    pub fn zero(&self) -> SampleValue {
        match self {
            SampleWidth::I16 => SampleValue::Int(0),
            SampleWidth::F32 => SampleValue::Float(0.0),
        }
    }
}

impl TryFrom<u8> for SampleWidth {
    type Error = FrameDecodeError;

    fn try_from(bytes: u8) -> std::result::Result<Self, Self::Error> {
        match bytes {
            2 => Ok(SampleWidth::I16),
            4 => Ok(SampleWidth::F32),
            other => Err(FrameDecodeError::UnsupportedWidth(other)),
        }
    }
}

impl std::fmt::Display for SampleWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleWidth::I16 => write!(f, "i16 (2 bytes)"),
            SampleWidth::F32 => write!(f, "f32 (4 bytes)"),
        }
    }
}

/// A single decoded channel value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Int(i16),
    Float(f32),
}

impl SampleValue {
    /// The width this value was decoded with
    pub fn width(&self) -> SampleWidth {
        match self {
            SampleValue::Int(_) => SampleWidth::I16,
            SampleValue::Float(_) => SampleWidth::F32,
        }
    }

    /// Widen to f64 for plotting
    pub fn as_f64(&self) -> f64 {
        match self {
            SampleValue::Int(v) => *v as f64,
            SampleValue::Float(v) => *v as f64,
        }
    }
}

impl std::fmt::Display for SampleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleValue::Int(v) => write!(f, "{}", v),
            SampleValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Lifecycle state of the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum AcquisitionState {
    /// Constructed, loop not started
    #[default]
    Idle = 0,
    /// Loop started, flushing stale transport input
    WarmingUp = 1,
    /// Steady state: reading and decoding frames
    Receiving = 2,
    /// Loop exited (shutdown requested or fatal read/decode error)
    Stopped = 3,
}

impl AcquisitionState {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => AcquisitionState::WarmingUp,
            2 => AcquisitionState::Receiving,
            3 => AcquisitionState::Stopped,
            _ => AcquisitionState::Idle,
        }
    }
}

impl std::fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionState::Idle => write!(f, "Idle"),
            AcquisitionState::WarmingUp => write!(f, "Warming up..."),
            AcquisitionState::Receiving => write!(f, "Receiving"),
            AcquisitionState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Counters accumulated by the acquisition loop
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AcquisitionStats {
    /// Frames read and decoded successfully
    pub frames_decoded: u64,
    /// Total bytes consumed from the transport
    pub bytes_read: u64,
    /// Reads that timed out before any byte of a frame arrived
    pub idle_timeouts: u64,
    /// Time spent in the Receiving state
    pub receiving_time: Duration,
}

impl AcquisitionStats {
    /// Record one decoded frame
    pub fn record_frame(&mut self, bytes: usize) {
        self.frames_decoded += 1;
        self.bytes_read += bytes as u64;
    }

    /// Record one idle read timeout
    pub fn record_idle_timeout(&mut self) {
        self.idle_timeouts += 1;
    }

    /// Average frame rate over the receiving period in Hz
    pub fn frame_rate_hz(&self) -> f64 {
        let secs = self.receiving_time.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.frames_decoded as f64 / secs
        }
    }
}
