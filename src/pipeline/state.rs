//! Lifecycle state shared by the pipeline owner and the acquisition thread.
//!
//! Holds the `running` flag (cleared to request shutdown), the one-shot
//! `receiving_confirmed` flag (set after the first decoded frame, never
//! reset), the current [`AcquisitionState`], and the last fatal error. The
//! first confirmation or failure also fires a one-shot readiness signal that
//! `start()` waits on with a timeout instead of polling.

use crate::types::AcquisitionState;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Outcome delivered through the readiness signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The first frame was decoded
    Receiving,
    /// The loop stopped before the first frame
    Failed(String),
}

/// Process-wide flags of one pipeline, owned through an `Arc`
#[derive(Debug)]
pub struct PipelineState {
    running: AtomicBool,
    receiving_confirmed: AtomicBool,
    acquisition: AtomicU8,
    last_error: Mutex<Option<String>>,
    ready_tx: Sender<Readiness>,
    ready_rx: Receiver<Readiness>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    pub fn new() -> Self {
        let (ready_tx, ready_rx) = bounded(1);
        Self {
            running: AtomicBool::new(false),
            receiving_confirmed: AtomicBool::new(false),
            acquisition: AtomicU8::new(AcquisitionState::Idle as u8),
            last_error: Mutex::new(None),
            ready_tx,
            ready_rx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Whether at least one frame has been decoded
    pub fn is_receiving_confirmed(&self) -> bool {
        self.receiving_confirmed.load(Ordering::SeqCst)
    }

    /// Mark the first successful decode.
    ///
    /// Returns true only for the call that flipped the flag.
    pub(crate) fn confirm_receiving(&self) -> bool {
        let first = !self.receiving_confirmed.swap(true, Ordering::SeqCst);
        if first {
            let _ = self.ready_tx.try_send(Readiness::Receiving);
        }
        first
    }

    pub fn acquisition_state(&self) -> AcquisitionState {
        AcquisitionState::from_u8(self.acquisition.load(Ordering::SeqCst))
    }

    pub(crate) fn transition(&self, next: AcquisitionState) {
        let prev = AcquisitionState::from_u8(self.acquisition.swap(next as u8, Ordering::SeqCst));
        if prev != next {
            tracing::debug!("Acquisition state: {} -> {}", prev, next);
        }
    }

    /// Record a fatal loop error and wake a pending `start()`
    pub(crate) fn fail(&self, message: String) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.clone());
        if !self.is_receiving_confirmed() {
            let _ = self.ready_tx.try_send(Readiness::Failed(message));
        }
    }

    /// Message of the error that stopped the loop, if any
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait for the first frame or a failure, at most `timeout`
    pub(crate) fn wait_ready(&self, timeout: Duration) -> Option<Readiness> {
        if self.is_receiving_confirmed() {
            return Some(Readiness::Receiving);
        }
        match self.ready_rx.recv_timeout(timeout) {
            Ok(readiness) => Some(readiness),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
