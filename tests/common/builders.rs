//! Test data builders for frames and configs

use serial_scope::config::AcquisitionConfig;

/// Builder for raw little-endian frames
#[derive(Debug, Default)]
pub struct FrameBuilder {
    bytes: Vec<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn i16(mut self, value: i16) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f32(mut self, value: f32) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Builder for acquisition configs suited to fast tests
pub struct AcquisitionConfigBuilder {
    config: AcquisitionConfig,
}

impl AcquisitionConfigBuilder {
    /// Defaults with no warm-up delay and a short start timeout
    pub fn new() -> Self {
        Self {
            config: AcquisitionConfig {
                warmup_ms: 0,
                start_timeout_ms: 2_000,
                ..AcquisitionConfig::default()
            },
        }
    }

    pub fn width(mut self, bytes: u8) -> Self {
        self.config.sample_width_bytes = bytes;
        self
    }

    pub fn channels(mut self, num_channels: usize) -> Self {
        self.config.num_channels = num_channels;
        self
    }

    pub fn history(mut self, length: usize) -> Self {
        self.config.history_length = length;
        self
    }

    pub fn warmup_ms(mut self, ms: u64) -> Self {
        self.config.warmup_ms = ms;
        self
    }

    pub fn start_timeout_ms(mut self, ms: u64) -> Self {
        self.config.start_timeout_ms = ms;
        self
    }

    pub fn build(self) -> AcquisitionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_builder() {
        let frame = FrameBuilder::new().i16(300).f32(1.0).build();
        assert_eq!(frame, vec![0x2C, 0x01, 0x00, 0x00, 0x80, 0x3F]);
    }

    #[test]
    fn test_config_builder() {
        let config = AcquisitionConfigBuilder::new().width(2).channels(1).build();
        assert_eq!(config.sample_width_bytes, 2);
        assert_eq!(config.num_channels, 1);
        assert_eq!(config.warmup_ms, 0);
    }
}
