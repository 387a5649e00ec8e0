//! Error handling for serial-scope
//!
//! This module defines the crate-wide error type and a Result alias for use
//! throughout the acquisition core. Frame decoding has its own error type in
//! [`crate::backend::decoder`] which converts into [`ScopeError`].

use crate::backend::decoder::FrameDecodeError;
use std::time::Duration;
use thiserror::Error;

/// Main error type for serial-scope operations
#[derive(Error, Debug)]
pub enum ScopeError {
    /// Invalid configuration, detected before any transport is opened
    #[error("Configuration error: {0}")]
    Config(String),

    /// The transport could not be opened
    #[error("Failed to connect to {address} at {rate} baud: {message}")]
    Connect {
        address: String,
        rate: u32,
        message: String,
    },

    /// A read timed out before any byte of the frame arrived
    #[error("Read timed out after {0:?}")]
    ReadTimeout(Duration),

    /// A read ended part-way through a frame
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// Any other transport read failure
    #[error("Read error: {0}")]
    Read(String),

    /// A raw frame could not be decoded
    #[error("Frame decode error: {0}")]
    FrameDecode(#[from] FrameDecodeError),

    /// The transport rejected an outbound command
    #[error("Transport write error: {0}")]
    TransportWrite(String),

    /// Timeout errors
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid lifecycle transition (e.g. starting a released pipeline)
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ScopeError>,
    },
}

impl ScopeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ScopeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error ends the acquisition loop.
    ///
    /// Idle read timeouts leave framing intact and are retried.
    pub fn is_fatal_for_acquisition(&self) -> bool {
        match self {
            ScopeError::ReadTimeout(_) => false,
            ScopeError::WithContext { source, .. } => source.is_fatal_for_acquisition(),
            _ => true,
        }
    }
}

/// Result type alias for serial-scope operations
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
