//! Serial port transport
//!
//! Opens a port with the `serialport` crate and splits it into a reader and
//! a writer via `try_clone`, so frames are read on the acquisition thread
//! while commands are written from the consumer.

use crate::backend::transport::{read_frame, CommandWriter, FrameReader, Transport};
use crate::config::SerialConfig;
use crate::error::{Result, ScopeError};
use serialport::{ClearBuffer, SerialPort};
use std::io::Write;
use std::time::Duration;

/// An open serial port
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    address: String,
    read_timeout: Duration,
}

impl SerialTransport {
    /// Open the configured port.
    ///
    /// Fails with [`ScopeError::Connect`] if the port cannot be opened.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let read_timeout = Duration::from_millis(config.read_timeout_ms);
        tracing::info!(
            "Trying to connect to {} at {} baud",
            config.port,
            config.baud_rate
        );

        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(read_timeout)
            .open()
            .map_err(|e| ScopeError::Connect {
                address: config.port.clone(),
                rate: config.baud_rate,
                message: e.to_string(),
            })?;

        tracing::info!("Connected to {} at {} baud", config.port, config.baud_rate);
        Ok(Self {
            port,
            address: config.port.clone(),
            read_timeout,
        })
    }

    /// List available serial ports
    pub fn list_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }
}

impl Transport for SerialTransport {
    fn address(&self) -> &str {
        &self.address
    }

    fn split(self: Box<Self>) -> Result<(Box<dyn FrameReader>, Box<dyn CommandWriter>)> {
        let writer = self.port.try_clone().map_err(|e| ScopeError::Connect {
            address: self.address.clone(),
            rate: self.port.baud_rate().unwrap_or(0),
            message: format!("failed to clone port handle: {}", e),
        })?;

        let reader = SerialReader {
            port: Some(self.port),
            address: self.address,
            read_timeout: self.read_timeout,
        };
        Ok((Box::new(reader), Box::new(SerialWriter { port: writer })))
    }
}

/// Read half of a serial port
struct SerialReader {
    /// `None` once released
    port: Option<Box<dyn SerialPort>>,
    address: String,
    read_timeout: Duration,
}

impl FrameReader for SerialReader {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| ScopeError::Read(format!("{} already closed", self.address)))?;
        read_frame(port, buf, self.read_timeout)
    }

    fn discard_input(&mut self) -> Result<()> {
        if let Some(port) = self.port.as_mut() {
            port.clear(ClearBuffer::Input)
                .map_err(|e| ScopeError::Read(format!("failed to flush input: {}", e)))?;
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::info!("Disconnected from {}", self.address);
        }
    }
}

/// Write half of a serial port
struct SerialWriter {
    port: Box<dyn SerialPort>,
}

impl CommandWriter for SerialWriter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.port
            .write_all(bytes)
            .and_then(|()| self.port.flush())
            .map_err(|e| ScopeError::TransportWrite(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_port_is_connect_error() {
        let config = SerialConfig {
            port: "/dev/serial-scope-does-not-exist".to_string(),
            ..SerialConfig::default()
        };
        match SerialTransport::open(&config) {
            Err(ScopeError::Connect { address, rate, .. }) => {
                assert_eq!(address, config.port);
                assert_eq!(rate, config.baud_rate);
            }
            Err(other) => panic!("expected connect error, got {other}"),
            Ok(_) => panic!("opened a port that should not exist"),
        }
    }

    #[test]
    fn test_list_ports_does_not_panic() {
        let _ = SerialTransport::list_ports();
    }
}
