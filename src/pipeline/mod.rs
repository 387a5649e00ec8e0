//! Acquisition pipeline: lifecycle owner of the producer/consumer split.
//!
//! [`AcquisitionPipeline`] ties together the pieces on both sides of the
//! thread boundary:
//!
//! - the [`AcquisitionWorker`] on its own thread, owning the read half of the
//!   transport and the decoder
//! - the [`SnapshotBridge`] holding the published frame and channel histories
//! - the [`CommandSink`] owning the write half of the transport
//! - the [`PipelineState`] with the running flag and readiness signal
//!
//! # Example
//!
//! ```ignore
//! use serial_scope::{config::ScopeConfig, pipeline::AcquisitionPipeline};
//!
//! let config = ScopeConfig::load_or_default(None);
//! let mut pipeline = AcquisitionPipeline::open(&config)?;
//! pipeline.start()?;
//!
//! // On the render tick:
//! let snapshot = pipeline.take_snapshot();
//! for (i, channel) in snapshot.channels.iter().enumerate() {
//!     plot(i, channel.as_plot_points());
//! }
//!
//! pipeline.send_command("K1.0%")?;
//! pipeline.stop()?;
//! ```

pub mod bridge;
pub mod history;
pub mod state;

pub use bridge::{Snapshot, SnapshotBridge};
pub use history::{ChannelHistory, DEFAULT_HISTORY_LENGTH};
pub use state::{PipelineState, Readiness};

use crate::backend::command::CommandSink;
use crate::backend::decoder::FrameDecoder;
use crate::backend::serial::SerialTransport;
use crate::backend::transport::{FrameReader, Transport};
use crate::backend::worker::AcquisitionWorker;
use crate::config::{AcquisitionConfig, ScopeConfig};
use crate::error::{Result, ScopeError};
use crate::types::{AcquisitionState, AcquisitionStats};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Owns one acquisition loop and its consumer-facing handles
pub struct AcquisitionPipeline {
    decoder: FrameDecoder,
    warmup: Duration,
    start_timeout: Duration,
    bridge: Arc<SnapshotBridge>,
    state: Arc<PipelineState>,
    commands: CommandSink,
    /// Read half, moved onto the worker thread by `start()`
    reader: Option<Box<dyn FrameReader>>,
    handle: Option<JoinHandle<Result<AcquisitionStats>>>,
}

impl AcquisitionPipeline {
    /// Validate the configuration, then open the configured serial port.
    ///
    /// Configuration errors are reported before any connection attempt.
    pub fn open(config: &ScopeConfig) -> Result<Self> {
        config.acquisition.validate()?;
        let transport = SerialTransport::open(&config.serial)?;
        Self::with_transport(&config.acquisition, Box::new(transport))
    }

    /// Build a pipeline over an already opened transport
    pub fn with_transport(config: &AcquisitionConfig, transport: Box<dyn Transport>) -> Result<Self> {
        let width = config.validate()?;
        let address = transport.address().to_string();
        let (reader, writer) = transport.split()?;

        let decoder = FrameDecoder::with_width(width, config.num_channels);
        tracing::info!(
            "Pipeline on {}: {} channels of {}, history {}",
            address,
            config.num_channels,
            width,
            config.history_length
        );

        Ok(Self {
            decoder,
            warmup: Duration::from_millis(config.warmup_ms),
            start_timeout: Duration::from_millis(config.start_timeout_ms),
            bridge: Arc::new(SnapshotBridge::new(
                width,
                config.num_channels,
                config.history_length,
            )),
            state: Arc::new(PipelineState::new()),
            commands: CommandSink::new(writer),
            reader: Some(reader),
            handle: None,
        })
    }

    /// Start the acquisition loop and wait for the first decoded frame.
    ///
    /// Returns once a frame has been decoded, or fails with
    /// [`ScopeError::Timeout`] if none arrives within the start timeout (the
    /// loop keeps running), or with [`ScopeError::Lifecycle`] if the loop
    /// stopped first. On an already started pipeline this reports the loop's
    /// current condition: `Ok` once receiving, `Lifecycle` once it has stopped,
    /// otherwise another bounded wait for the first frame.
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            if self.state.acquisition_state() == AcquisitionState::Stopped {
                return Err(ScopeError::Lifecycle(format!(
                    "acquisition loop has stopped: {}",
                    self.last_error()
                        .unwrap_or_else(|| "no error recorded".to_string())
                )));
            }
        } else {
            self.spawn_worker()?;
        }

        match self.state.wait_ready(self.start_timeout + self.warmup) {
            Some(Readiness::Receiving) => Ok(()),
            Some(Readiness::Failed(message)) => Err(ScopeError::Lifecycle(format!(
                "acquisition stopped before the first frame: {}",
                message
            ))),
            None => Err(ScopeError::Timeout(format!(
                "no frame received within {:?}",
                self.start_timeout
            ))),
        }
    }

    fn spawn_worker(&mut self) -> Result<()> {
        let reader = self.reader.take().ok_or_else(|| {
            ScopeError::Lifecycle("transport was released by a previous stop".to_string())
        })?;

        let worker = AcquisitionWorker::new(
            reader,
            self.decoder,
            Arc::clone(&self.bridge),
            Arc::clone(&self.state),
            self.warmup,
        );
        self.state.set_running(true);
        let handle = std::thread::Builder::new()
            .name("acquisition".to_string())
            .spawn(move || worker.run())?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Request shutdown and wait for the loop to reach `Stopped`.
    ///
    /// Returns the loop's statistics, or the fatal error that stopped it
    /// earlier. The wait is bounded by the transport's read timeout.
    pub fn stop(&mut self) -> Result<AcquisitionStats> {
        self.state.set_running(false);
        let Some(handle) = self.handle.take() else {
            return Ok(AcquisitionStats::default());
        };

        tracing::info!("Stopping acquisition...");
        handle
            .join()
            .map_err(|_| ScopeError::Lifecycle("acquisition thread panicked".to_string()))?
    }

    /// Copy the newest generation of every channel
    pub fn take_snapshot(&self) -> Snapshot {
        self.bridge.take_snapshot()
    }

    /// Send a text command to the device
    pub fn send_command(&self, command: &str) -> Result<()> {
        self.commands.send(command)
    }

    /// Shared handle for consumers on other threads
    pub fn snapshot_bridge(&self) -> Arc<SnapshotBridge> {
        Arc::clone(&self.bridge)
    }

    pub fn state(&self) -> AcquisitionState {
        self.state.acquisition_state()
    }

    pub fn is_receiving(&self) -> bool {
        self.state.is_receiving_confirmed()
    }

    /// Error that stopped the loop, if any
    pub fn last_error(&self) -> Option<String> {
        self.state.last_error()
    }

    pub fn num_channels(&self) -> usize {
        self.decoder.num_channels()
    }

    pub fn frame_len(&self) -> usize {
        self.decoder.frame_len()
    }
}

impl Drop for AcquisitionPipeline {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.stop();
        }
    }
}
