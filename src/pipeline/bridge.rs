//! Snapshot bridge between the acquisition thread and the consumer.
//!
//! The acquisition loop publishes each decoded frame in one critical section:
//! the raw bytes, the decoded values and one append to every channel history
//! happen under the same lock, and the generation counter is bumped last.
//! [`SnapshotBridge::take_snapshot`] copies all of it under that lock, so a
//! snapshot always holds exactly one generation across every channel.
//!
//! The lock is held only for the copy; the consumer never waits for new data
//! and a slow consumer never delays the producer by more than one copy.

use crate::pipeline::history::ChannelHistory;
use crate::types::{SampleValue, SampleWidth};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Point-in-time copy of the latest frame and every channel history
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Number of frames published when the snapshot was taken (0 = none yet)
    pub generation: u64,
    /// Wall-clock time of the copy
    pub taken_at: DateTime<Utc>,
    /// Raw bytes of the latest frame (all zeros before the first frame)
    pub raw_frame: Vec<u8>,
    /// Decoded latest value per channel
    pub latest: Vec<SampleValue>,
    /// History per channel, oldest value first
    pub channels: Vec<ChannelHistory>,
}

impl Snapshot {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// History of one channel
    pub fn channel(&self, index: usize) -> Option<&ChannelHistory> {
        self.channels.get(index)
    }

    /// Latest value of one channel
    pub fn latest(&self, index: usize) -> Option<SampleValue> {
        self.latest.get(index).copied()
    }

    /// Whether any frame has been published yet
    pub fn has_data(&self) -> bool {
        self.generation > 0
    }
}

/// The current published generation
#[derive(Debug)]
struct Published {
    generation: u64,
    raw_frame: Vec<u8>,
    latest: Vec<SampleValue>,
    channels: Vec<ChannelHistory>,
}

/// Synchronisation point owning the shared, published state
#[derive(Debug)]
pub struct SnapshotBridge {
    inner: Mutex<Published>,
}

impl SnapshotBridge {
    /// Create a bridge with `num_channels` zero-filled histories of length
    /// `history_length`.
    pub fn new(width: SampleWidth, num_channels: usize, history_length: usize) -> Self {
        let published = Published {
            generation: 0,
            raw_frame: vec![0; num_channels * width.size_bytes()],
            latest: vec![width.zero(); num_channels],
            channels: (0..num_channels)
                .map(|_| ChannelHistory::new(history_length, width))
                .collect(),
        };
        Self {
            inner: Mutex::new(published),
        }
    }

    /// Publish one decoded frame atomically with respect to snapshots.
    ///
    /// `values` must hold one value per channel; extra values are ignored.
    pub fn publish(&self, raw_frame: &[u8], values: &[SampleValue]) -> u64 {
        let mut published = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        published.raw_frame.clear();
        published.raw_frame.extend_from_slice(raw_frame);
        published.latest.clear();
        published.latest.extend_from_slice(values);
        for (history, value) in published.channels.iter_mut().zip(values) {
            history.append(*value);
        }
        published.generation += 1;
        published.generation
    }

    /// Copy the current generation
    pub fn take_snapshot(&self) -> Snapshot {
        let published = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Snapshot {
            generation: published.generation,
            taken_at: Utc::now(),
            raw_frame: published.raw_frame.clone(),
            latest: published.latest.clone(),
            channels: published.channels.clone(),
        }
    }

    /// Number of frames published so far
    pub fn generation(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }
}
