//! Backend module: everything on the device side of the snapshot bridge
//!
//! The acquisition loop runs in a separate thread from the consumer. It owns
//! the read half of the transport and the decoder; the write half stays with
//! the command sink so commands never wait on a blocking read.
//!
//! # Components
//!
//! - [`FrameDecoder`] - Fixed-layout little-endian frame decoding
//! - [`Transport`] / [`FrameReader`] / [`CommandWriter`] - Byte transport seam
//! - [`SerialTransport`] - Serial port transport (serialport)
//! - [`MemoryTransport`] - Channel-fed transport for replays and tests
//! - [`MockTransport`] - Synthetic waveforms (feature-gated)
//! - [`AcquisitionWorker`] - The acquisition loop state machine
//! - [`CommandSink`] - Outbound text commands
//!
//! # Example
//!
//! ```ignore
//! use serial_scope::backend::{FrameDecoder, SerialTransport, Transport};
//! use serial_scope::config::SerialConfig;
//!
//! let transport = SerialTransport::open(&SerialConfig::default())?;
//! let (mut reader, mut writer) = Box::new(transport).split()?;
//!
//! let decoder = FrameDecoder::new(4, 3)?;
//! let mut frame = vec![0u8; decoder.frame_len()];
//! reader.read_exact(&mut frame)?;
//! let values = decoder.decode(&frame)?;
//!
//! writer.write_all(b"R")?;
//! ```

pub mod command;
pub mod decoder;
pub mod memory;
#[cfg(feature = "mock-transport")]
pub mod mock_transport;
pub mod serial;
pub mod transport;
pub mod worker;

pub use command::CommandSink;
pub use decoder::{FrameDecodeError, FrameDecoder};
pub use memory::{MemoryFeed, MemoryTransport};
#[cfg(feature = "mock-transport")]
pub use mock_transport::{MockPattern, MockTransport};
pub use serial::SerialTransport;
pub use transport::{read_frame, CommandWriter, FrameReader, Transport};
pub use worker::AcquisitionWorker;
