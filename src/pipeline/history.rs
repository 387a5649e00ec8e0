//! Fixed-capacity per-channel history
//!
//! Each channel keeps the most recent `L` values, oldest first. The buffer is
//! pre-filled with the width's zero so it is never empty and its length is
//! always exactly `L`.

use crate::types::{SampleValue, SampleWidth};
use serde::Serialize;
use std::collections::VecDeque;

/// Default number of values retained per channel
pub const DEFAULT_HISTORY_LENGTH: usize = 100;

/// Ring buffer of the most recent values of one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelHistory {
    values: VecDeque<SampleValue>,
    capacity: usize,
}

impl ChannelHistory {
    /// Create a history of `capacity` zeros of the given width.
    ///
    /// A zero capacity is clamped to one.
    pub fn new(capacity: usize, width: SampleWidth) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: std::iter::repeat(width.zero()).take(capacity).collect(),
            capacity,
        }
    }

    /// Append a value, evicting the oldest
    pub fn append(&mut self, value: SampleValue) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Ordered copy of all values, oldest first
    pub fn snapshot_sequence(&self) -> Vec<SampleValue> {
        self.values.iter().copied().collect()
    }

    /// Values widened to f64, oldest first
    pub fn as_f64_series(&self) -> Vec<f64> {
        self.values.iter().map(SampleValue::as_f64).collect()
    }

    /// Plot points with the slot index as x, matching a fixed-width x axis
    pub fn as_plot_points(&self) -> Vec<[f64; 2]> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| [i as f64, v.as_f64()])
            .collect()
    }

    /// Most recent value
    pub fn latest(&self) -> SampleValue {
        // never empty: pre-filled and append keeps len == capacity
        self.values[self.values.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefilled_with_zero() {
        let history = ChannelHistory::new(DEFAULT_HISTORY_LENGTH, SampleWidth::F32);
        assert_eq!(history.len(), DEFAULT_HISTORY_LENGTH);
        assert!(!history.is_empty());
        assert!(history.iter().all(|v| *v == SampleValue::Float(0.0)));
        assert_eq!(history.latest(), SampleValue::Float(0.0));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = ChannelHistory::new(0, SampleWidth::I16);
        assert_eq!(history.capacity(), 1);
        history.append(SampleValue::Int(5));
        assert_eq!(history.snapshot_sequence(), vec![SampleValue::Int(5)]);
    }

    #[test]
    fn test_append_evicts_oldest() {
        let mut history = ChannelHistory::new(3, SampleWidth::I16);
        for v in 1..=4 {
            history.append(SampleValue::Int(v));
        }
        assert_eq!(
            history.snapshot_sequence(),
            vec![SampleValue::Int(2), SampleValue::Int(3), SampleValue::Int(4)]
        );
        assert_eq!(history.latest(), SampleValue::Int(4));
    }

    #[test]
    fn test_partial_fill_keeps_leading_zeros() {
        let mut history = ChannelHistory::new(4, SampleWidth::I16);
        history.append(SampleValue::Int(9));
        assert_eq!(history.as_f64_series(), vec![0.0, 0.0, 0.0, 9.0]);
        assert_eq!(history.as_plot_points()[3], [3.0, 9.0]);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_length_is_always_capacity(
            capacity in 1usize..64,
            values in prop::collection::vec(any::<i16>(), 0..200)
        ) {
            let mut history = ChannelHistory::new(capacity, SampleWidth::I16);
            prop_assert_eq!(history.len(), capacity);
            for v in values {
                history.append(SampleValue::Int(v));
                prop_assert_eq!(history.len(), capacity);
            }
        }

        #[test]
        fn test_history_is_last_l_values_in_order(
            capacity in 1usize..64,
            values in prop::collection::vec(any::<i16>(), 0..200)
        ) {
            let mut history = ChannelHistory::new(capacity, SampleWidth::I16);
            for &v in &values {
                history.append(SampleValue::Int(v));
            }

            let tail: Vec<_> = values
                .iter()
                .skip(values.len().saturating_sub(capacity))
                .map(|&v| SampleValue::Int(v))
                .collect();
            let sequence = history.snapshot_sequence();
            let (zeros, appended) = sequence.split_at(capacity - tail.len());

            prop_assert!(zeros.iter().all(|v| *v == SampleValue::Int(0)));
            prop_assert_eq!(appended, tail.as_slice());
        }
    }
}
