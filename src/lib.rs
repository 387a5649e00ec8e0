//! # Serial-Scope: serial data acquisition for live plotting
//!
//! Reads fixed-size binary frames of N channel values from a serial device,
//! keeps a bounded history per channel and hands consistent snapshots to a
//! consumer polling on a fixed period. Text commands go back to the device
//! on the same link.
//!
//! ## Architecture
//!
//! - **Backend**: Transport, decoder and the acquisition loop on its own thread
//! - **Pipeline**: Snapshot bridge, channel histories and lifecycle control
//! - **Frontend**: Console consumer polling the bridge
//! - **Communication**: One mutex-protected published generation; crossbeam
//!   channels for the readiness signal and in-memory transports
//!
//! ## Configuration
//!
//! Read from a TOML file, by default in the platform config directory under
//! `dev.hxyulin.serial-scope`. See [`config`] for the full layout.
//!
//! ## Example
//!
//! ```ignore
//! use serial_scope::{config::ScopeConfig, pipeline::AcquisitionPipeline};
//!
//! fn main() -> serial_scope::Result<()> {
//!     let config = ScopeConfig::load_or_default(None);
//!     let mut pipeline = AcquisitionPipeline::open(&config)?;
//!     pipeline.start()?;
//!
//!     let snapshot = pipeline.take_snapshot();
//!     println!("{:?}", snapshot.latest);
//!
//!     pipeline.send_command("R")?;
//!     pipeline.stop()?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod frontend;
pub mod logging;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use backend::{FrameDecoder, SerialTransport, Transport};
pub use config::ScopeConfig;
pub use error::{Result, ScopeError};
pub use pipeline::{AcquisitionPipeline, Snapshot};
pub use types::{AcquisitionState, AcquisitionStats, SampleValue, SampleWidth};
