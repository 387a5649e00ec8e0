//! Acquisition worker thread implementation
//!
//! This module contains the loop that runs on its own thread, reads exact
//! frames from the transport, decodes them and publishes them to the
//! [`SnapshotBridge`].
//!
//! # State machine
//!
//! `Idle → WarmingUp → Receiving → Stopped`
//!
//! - **WarmingUp**: waits the configured warm-up delay, then discards any
//!   bytes the transport buffered while the pipeline was initialising.
//! - **Receiving**: blocking exact reads, decode, publish. The first decoded
//!   frame sets `receiving_confirmed`.
//! - **Stopped**: entered when `running` is cleared or on a fatal error. The
//!   read half of the transport is released on the way out.
//!
//! # Failure policy
//!
//! Framing is purely positional, so a short read or a decode error would
//! misalign every later frame. Both end the loop; there is no retry and no
//! resynchronisation. A read timeout before any byte of a frame arrived is
//! not a misalignment and only re-checks the `running` flag.

use crate::backend::decoder::FrameDecoder;
use crate::backend::transport::FrameReader;
use crate::error::Result;
use crate::pipeline::bridge::SnapshotBridge;
use crate::pipeline::state::PipelineState;
use crate::types::{AcquisitionState, AcquisitionStats, SampleValue};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity of the warm-up sleep, so shutdown is observed promptly
const WARMUP_SLICE: Duration = Duration::from_millis(20);

/// The acquisition loop and everything it exclusively owns
pub struct AcquisitionWorker {
    reader: Box<dyn FrameReader>,
    decoder: FrameDecoder,
    bridge: Arc<SnapshotBridge>,
    state: Arc<PipelineState>,
    warmup: Duration,
    /// Reused raw frame buffer
    raw: Vec<u8>,
    /// Reused decode output
    values: Vec<SampleValue>,
    stats: AcquisitionStats,
}

impl AcquisitionWorker {
    pub fn new(
        reader: Box<dyn FrameReader>,
        decoder: FrameDecoder,
        bridge: Arc<SnapshotBridge>,
        state: Arc<PipelineState>,
        warmup: Duration,
    ) -> Self {
        Self {
            raw: vec![0; decoder.frame_len()],
            values: Vec::with_capacity(decoder.num_channels()),
            reader,
            decoder,
            bridge,
            state,
            warmup,
            stats: AcquisitionStats::default(),
        }
    }

    /// Run until shutdown is requested or a fatal error occurs.
    ///
    /// The caller is expected to have set `running` before spawning.
    pub fn run(mut self) -> Result<AcquisitionStats> {
        tracing::info!(
            "Acquisition worker started ({} channels, {} bytes per frame)",
            self.decoder.num_channels(),
            self.decoder.frame_len()
        );

        self.state.transition(AcquisitionState::WarmingUp);
        let result = self.warm_up().and_then(|()| self.receive());

        self.reader.close();
        self.state.transition(AcquisitionState::Stopped);

        match result {
            Ok(()) => {
                tracing::info!(
                    "Acquisition worker stopped after {} frames ({:.1} Hz)",
                    self.stats.frames_decoded,
                    self.stats.frame_rate_hz()
                );
                Ok(self.stats)
            }
            Err(e) => {
                tracing::error!(
                    "Acquisition loop failed after {} frames: {}",
                    self.stats.frames_decoded,
                    e
                );
                self.state.fail(e.to_string());
                Err(e)
            }
        }
    }

    fn warm_up(&mut self) -> Result<()> {
        let deadline = Instant::now() + self.warmup;
        while self.state.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(WARMUP_SLICE.min(deadline - now));
        }
        self.reader.discard_input()
    }

    fn receive(&mut self) -> Result<()> {
        if !self.state.is_running() {
            return Ok(());
        }

        self.state.transition(AcquisitionState::Receiving);
        let started = Instant::now();
        let result = self.receive_frames();
        self.stats.receiving_time = started.elapsed();
        result
    }

    fn receive_frames(&mut self) -> Result<()> {
        while self.state.is_running() {
            match self.reader.read_exact(&mut self.raw) {
                Ok(()) => {}
                Err(e) if !e.is_fatal_for_acquisition() => {
                    self.stats.record_idle_timeout();
                    tracing::trace!("{}", e);
                    continue;
                }
                Err(e) => return Err(e),
            }

            self.decoder.decode_into(&self.raw, &mut self.values)?;
            self.bridge.publish(&self.raw, &self.values);
            self.stats.record_frame(self.raw.len());

            if self.state.confirm_receiving() {
                tracing::info!("Receiving data");
            }
        }
        Ok(())
    }
}
