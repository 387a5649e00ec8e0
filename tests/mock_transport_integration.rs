//! End-to-end run over the synthetic transport
//!
//! Only built with the `mock-transport` feature.

#![cfg(feature = "mock-transport")]

mod common;

use common::builders::AcquisitionConfigBuilder;
use common::mock_helpers::create_test_mock_transport;
use common::{test_timeout, wait_until};
use serial_scope::pipeline::AcquisitionPipeline;
use serial_scope::types::SampleValue;

#[test]
fn test_mock_transport_feeds_pipeline() {
    let config = AcquisitionConfigBuilder::new()
        .width(2)
        .channels(2)
        .history(8)
        .build();
    let transport = create_test_mock_transport(2, 2);
    let commands = transport.command_log();

    let mut pipeline = AcquisitionPipeline::with_transport(&config, Box::new(transport)).unwrap();
    pipeline.start().unwrap();
    assert!(wait_until(test_timeout(), || {
        pipeline.take_snapshot().generation >= 10
    }));

    // channel 0 counts up by one per frame
    let snapshot = pipeline.take_snapshot();
    let series = snapshot.channels[0].as_f64_series();
    assert!(series.windows(2).all(|w| w[1] - w[0] == 1.0));
    assert!(matches!(snapshot.latest(1), Some(SampleValue::Int(_))));

    pipeline.send_command("S50%").unwrap();
    assert_eq!(*commands.lock().unwrap(), vec!["S50%".to_string()]);

    let stats = pipeline.stop().unwrap();
    assert!(stats.frames_decoded >= 10);
}
