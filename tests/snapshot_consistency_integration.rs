//! Snapshot consistency under load
//!
//! A producer thread feeds frames whose every channel carries the frame's
//! sequence number while the test hammers `take_snapshot()`. Every observed
//! snapshot must hold a single generation across all channels.

mod common;

use common::builders::{AcquisitionConfigBuilder, FrameBuilder};
use common::mock_helpers::memory_pipeline;
use common::{test_timeout, wait_until};
use serial_scope::types::{AcquisitionState, SampleValue};
use serial_test::serial;
use std::thread;

const CHANNELS: usize = 4;
const FRAMES: i16 = 2_000;

#[test]
#[serial]
fn test_snapshots_never_mix_generations_across_channels() {
    let config = AcquisitionConfigBuilder::new()
        .width(2)
        .channels(CHANNELS)
        .history(32)
        .start_timeout_ms(10)
        .build();
    let (mut pipeline, feed) = memory_pipeline(&config);

    // frames queued before the warm-up flush would be discarded
    assert!(pipeline.start().is_err());
    assert!(wait_until(test_timeout(), || {
        pipeline.state() == AcquisitionState::Receiving
    }));

    let producer = thread::spawn(move || {
        for seq in 1..=FRAMES {
            let frame = (0..CHANNELS)
                .fold(FrameBuilder::new(), |b, _| b.i16(seq))
                .build();
            feed.push(frame);
        }
        feed
    });

    let mut observed = 0u64;
    let mut last_generation = 0;
    while last_generation < FRAMES as u64 {
        let snapshot = pipeline.take_snapshot();
        assert!(snapshot.generation >= last_generation);
        last_generation = snapshot.generation;

        let first = snapshot.latest[0];
        assert!(snapshot.latest.iter().all(|v| *v == first));

        let reference = snapshot.channels[0].snapshot_sequence();
        for history in &snapshot.channels[1..] {
            assert_eq!(history.snapshot_sequence(), reference);
        }
        // FIFO order holds within each history
        let series = snapshot.channels[0].as_f64_series();
        assert!(series.windows(2).all(|w| w[0] <= w[1]));

        observed += 1;
        if observed > 10_000_000 {
            panic!("producer stalled at generation {}", last_generation);
        }
    }

    assert!(wait_until(test_timeout(), || {
        pipeline.take_snapshot().generation == FRAMES as u64
    }));
    let snapshot = pipeline.take_snapshot();
    assert_eq!(snapshot.latest(CHANNELS - 1), Some(SampleValue::Int(FRAMES)));
    assert_eq!(snapshot.channels[0].len(), 32);

    let stats = pipeline.stop().unwrap();
    assert_eq!(stats.frames_decoded, FRAMES as u64);
    drop(producer.join().unwrap());
}
