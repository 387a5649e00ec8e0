//! Outbound command sink
//!
//! Sends short text commands to the remote device. Commands are written
//! verbatim as UTF-8; the caller owns any terminator convention (for example
//! a trailing `%`). Writes are synchronous and never retried.

use crate::backend::transport::CommandWriter;
use crate::error::{Result, ScopeError};
use std::sync::{Mutex, PoisonError};

/// Synchronous writer for text commands, independent of the read path
pub struct CommandSink {
    writer: Mutex<Box<dyn CommandWriter>>,
}

impl CommandSink {
    pub fn new(writer: Box<dyn CommandWriter>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Write `command` to the transport.
    ///
    /// Fails with [`ScopeError::TransportWrite`] if the transport rejects the
    /// write. The read path is unaffected either way.
    pub fn send(&self, command: &str) -> Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        match writer.write_all(command.as_bytes()) {
            Ok(()) => {
                tracing::debug!("Sent command {:?}", command);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to send command {:?}: {}", command, e);
                Err(match e {
                    ScopeError::TransportWrite(_) => e,
                    other => ScopeError::TransportWrite(other.to_string()),
                })
            }
        }
    }
}
