//! Mock transport for running without hardware
//!
//! Generates frames from per-channel waveform patterns at a fixed frame
//! interval and encodes them with the same [`FrameDecoder`] layout the
//! pipeline decodes. Commands written to it are logged and recorded.
//!
//! # Patterns
//!
//! - [`MockPattern::Constant`] - Fixed value
//! - [`MockPattern::Sine`] - Sinusoidal wave
//! - [`MockPattern::Counter`] - Incrementing counter with wrap-around
//! - [`MockPattern::Square`] - Square wave alternating between two values
//!
//! # Enabling
//!
//! Only available with the `mock-transport` feature:
//!
//! ```bash
//! cargo run --features mock-transport -- --mock
//! ```

use crate::backend::decoder::FrameDecoder;
use crate::backend::transport::{CommandWriter, FrameReader, Transport};
use crate::error::{Result, ScopeError};
use crate::types::{SampleValue, SampleWidth};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Waveform of one mock channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockPattern {
    /// Constant value
    Constant(f64),
    /// Sine wave with frequency (Hz), amplitude and offset
    Sine {
        frequency: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Counter that increments by `step` per frame
    Counter { step: f64, min: f64, max: f64 },
    /// Square wave
    Square { period: f64, amplitude: f64 },
}

impl Default for MockPattern {
    fn default() -> Self {
        MockPattern::Sine {
            frequency: 1.0,
            amplitude: 100.0,
            offset: 0.0,
        }
    }
}

/// Generator state of one channel
#[derive(Debug, Clone)]
struct ChannelGenerator {
    pattern: MockPattern,
    counter_value: f64,
}

impl ChannelGenerator {
    fn new(pattern: MockPattern) -> Self {
        let counter_value = match pattern {
            MockPattern::Counter { min, step, .. } => min - step,
            _ => 0.0,
        };
        Self {
            pattern,
            counter_value,
        }
    }

    fn generate(&mut self, elapsed_secs: f64) -> f64 {
        match self.pattern {
            MockPattern::Constant(v) => v,
            MockPattern::Sine {
                frequency,
                amplitude,
                offset,
            } => offset + amplitude * (2.0 * std::f64::consts::PI * frequency * elapsed_secs).sin(),
            MockPattern::Counter { step, min, max } => {
                self.counter_value += step;
                if self.counter_value > max {
                    self.counter_value = min;
                } else if self.counter_value < min {
                    self.counter_value = max;
                }
                self.counter_value
            }
            MockPattern::Square { period, amplitude } => {
                if elapsed_secs % period < period / 2.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
        }
    }
}

/// Convert a generated value into the wire width, saturating for i16
fn to_sample(width: SampleWidth, value: f64) -> SampleValue {
    match width {
        SampleWidth::I16 => {
            SampleValue::Int(value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16)
        }
        SampleWidth::F32 => SampleValue::Float(value as f32),
    }
}

/// Transport that synthesizes frames
pub struct MockTransport {
    decoder: FrameDecoder,
    patterns: Vec<MockPattern>,
    frame_interval: Duration,
    commands: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    /// Create a mock with the default pattern on every channel
    pub fn new(decoder: FrameDecoder, frame_interval: Duration) -> Self {
        Self {
            patterns: vec![MockPattern::default(); decoder.num_channels()],
            decoder,
            frame_interval,
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the pattern of one channel; out-of-range indices are ignored
    pub fn with_pattern(mut self, channel: usize, pattern: MockPattern) -> Self {
        if let Some(slot) = self.patterns.get_mut(channel) {
            *slot = pattern;
        }
        self
    }

    /// Handle to the commands written so far
    pub fn command_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.commands)
    }
}

impl Transport for MockTransport {
    fn address(&self) -> &str {
        "mock"
    }

    fn split(self: Box<Self>) -> Result<(Box<dyn FrameReader>, Box<dyn CommandWriter>)> {
        let reader = MockReader {
            decoder: self.decoder,
            generators: self.patterns.into_iter().map(ChannelGenerator::new).collect(),
            frame_interval: self.frame_interval,
            started: Instant::now(),
            next_frame: Instant::now(),
        };
        let writer = MockWriter {
            commands: self.commands,
        };
        Ok((Box::new(reader), Box::new(writer)))
    }
}

struct MockReader {
    decoder: FrameDecoder,
    generators: Vec<ChannelGenerator>,
    frame_interval: Duration,
    started: Instant,
    next_frame: Instant,
}

impl FrameReader for MockReader {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let now = Instant::now();
        if self.next_frame > now {
            std::thread::sleep(self.next_frame - now);
        }
        self.next_frame += self.frame_interval;

        let elapsed = self.started.elapsed().as_secs_f64();
        let width = self.decoder.width();
        let values: Vec<SampleValue> = self
            .generators
            .iter_mut()
            .map(|g| to_sample(width, g.generate(elapsed)))
            .collect();
        let frame = self.decoder.encode(&values)?;

        if frame.len() != buf.len() {
            return Err(ScopeError::ShortRead {
                expected: buf.len(),
                actual: frame.len(),
            });
        }
        buf.copy_from_slice(&frame);
        Ok(())
    }

    fn discard_input(&mut self) -> Result<()> {
        self.next_frame = Instant::now();
        Ok(())
    }
}

struct MockWriter {
    commands: Arc<Mutex<Vec<String>>>,
}

impl CommandWriter for MockWriter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let command = String::from_utf8_lossy(bytes).into_owned();
        tracing::info!("Mock device received command {:?}", command);
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_wraps() {
        let mut gen = ChannelGenerator::new(MockPattern::Counter {
            step: 1.0,
            min: 0.0,
            max: 2.0,
        });
        let values: Vec<f64> = (0..5).map(|_| gen.generate(0.0)).collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_i16_saturates() {
        assert_eq!(to_sample(SampleWidth::I16, 1.0e9), SampleValue::Int(i16::MAX));
        assert_eq!(to_sample(SampleWidth::I16, -2.6), SampleValue::Int(-3));
        assert_eq!(to_sample(SampleWidth::F32, 0.5), SampleValue::Float(0.5));
    }

    #[test]
    fn test_frames_decode_with_same_layout() {
        let decoder = FrameDecoder::new(2, 2).unwrap();
        let transport = MockTransport::new(decoder, Duration::ZERO)
            .with_pattern(0, MockPattern::Constant(300.0))
            .with_pattern(1, MockPattern::Constant(-1.0));
        let (mut reader, _writer) = Box::new(transport).split().unwrap();

        let mut buf = vec![0u8; decoder.frame_len()];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(
            decoder.decode(&buf).unwrap(),
            vec![SampleValue::Int(300), SampleValue::Int(-1)]
        );
    }

    #[test]
    fn test_commands_are_recorded() {
        let decoder = FrameDecoder::new(4, 1).unwrap();
        let transport = MockTransport::new(decoder, Duration::ZERO);
        let log = transport.command_log();
        let (_reader, mut writer) = Box::new(transport).split().unwrap();

        writer.write_all(b"R").unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["R".to_string()]);
    }
}
