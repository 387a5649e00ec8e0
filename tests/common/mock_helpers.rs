//! Mock construction helpers

use serial_scope::backend::{MemoryFeed, MemoryTransport};
use serial_scope::config::AcquisitionConfig;
use serial_scope::pipeline::AcquisitionPipeline;
use std::time::Duration;

#[cfg(feature = "mock-transport")]
use serial_scope::backend::{FrameDecoder, MockPattern, MockTransport};

/// Read timeout of test memory transports
pub const MEMORY_READ_TIMEOUT: Duration = Duration::from_millis(20);

/// Build a pipeline over an in-memory transport
pub fn memory_pipeline(config: &AcquisitionConfig) -> (AcquisitionPipeline, MemoryFeed) {
    let (transport, feed) = MemoryTransport::new(MEMORY_READ_TIMEOUT);
    let pipeline = AcquisitionPipeline::with_transport(config, Box::new(transport))
        .expect("memory pipeline should build");
    (pipeline, feed)
}

#[cfg(feature = "mock-transport")]
pub fn create_test_mock_transport(width: u8, channels: usize) -> MockTransport {
    let decoder = FrameDecoder::new(width, channels).expect("valid layout");
    MockTransport::new(decoder, Duration::from_millis(1)).with_pattern(
        0,
        MockPattern::Counter {
            step: 1.0,
            min: 0.0,
            max: 1000.0,
        },
    )
}
