//! In-memory transport fed through crossbeam channels
//!
//! Useful when bytes come from somewhere other than a serial port (a socket
//! bridge, a replay, a test). The [`MemoryFeed`] handle pushes inbound byte
//! chunks and receives everything written by the command sink.
//!
//! Chunk boundaries are not frame boundaries: a frame may span several chunks
//! and a chunk may hold several frames, as with a real serial stream.

use crate::backend::transport::{CommandWriter, FrameReader, Transport};
use crate::error::{Result, ScopeError};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::collections::VecDeque;
use std::time::Duration;

/// Producer-side handle of a [`MemoryTransport`]
#[derive(Debug, Clone)]
pub struct MemoryFeed {
    inbound: Sender<Vec<u8>>,
    outbound: Receiver<Vec<u8>>,
}

impl MemoryFeed {
    /// Queue bytes for the reader. Returns false once the transport is gone.
    pub fn push(&self, bytes: impl Into<Vec<u8>>) -> bool {
        self.inbound.send(bytes.into()).is_ok()
    }

    /// Everything written so far, one entry per write
    pub fn drain_written(&self) -> Vec<Vec<u8>> {
        self.outbound.try_iter().collect()
    }

    /// Wait for the next write
    pub fn recv_written(&self, timeout: Duration) -> Option<Vec<u8>> {
        self.outbound.recv_timeout(timeout).ok()
    }
}

/// Transport backed by in-process channels
pub struct MemoryTransport {
    inbound: Receiver<Vec<u8>>,
    outbound: Sender<Vec<u8>>,
    read_timeout: Duration,
}

impl MemoryTransport {
    /// Create a transport and its feed handle.
    ///
    /// `read_timeout` bounds how long a read waits for the next chunk.
    pub fn new(read_timeout: Duration) -> (Self, MemoryFeed) {
        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = unbounded();
        (
            Self {
                inbound: in_rx,
                outbound: out_tx,
                read_timeout,
            },
            MemoryFeed {
                inbound: in_tx,
                outbound: out_rx,
            },
        )
    }
}

impl Transport for MemoryTransport {
    fn address(&self) -> &str {
        "memory"
    }

    fn split(self: Box<Self>) -> Result<(Box<dyn FrameReader>, Box<dyn CommandWriter>)> {
        let reader = MemoryReader {
            inbound: self.inbound,
            pending: VecDeque::new(),
            read_timeout: self.read_timeout,
        };
        let writer = MemoryWriter {
            outbound: self.outbound,
        };
        Ok((Box::new(reader), Box::new(writer)))
    }
}

struct MemoryReader {
    inbound: Receiver<Vec<u8>>,
    /// Bytes received but not yet consumed by a frame
    pending: VecDeque<u8>,
    read_timeout: Duration,
}

impl FrameReader for MemoryReader {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        while self.pending.len() < buf.len() {
            match self.inbound.recv_timeout(self.read_timeout) {
                Ok(chunk) => self.pending.extend(chunk),
                Err(RecvTimeoutError::Timeout) if self.pending.is_empty() => {
                    return Err(ScopeError::ReadTimeout(self.read_timeout));
                }
                Err(RecvTimeoutError::Disconnected) if self.pending.is_empty() => {
                    return Err(ScopeError::Read("memory feed closed".to_string()));
                }
                Err(_) => {
                    return Err(ScopeError::ShortRead {
                        expected: buf.len(),
                        actual: self.pending.len(),
                    });
                }
            }
        }

        let n = buf.len();
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(())
    }

    fn discard_input(&mut self) -> Result<()> {
        let dropped = self.pending.len()
            + self
                .inbound
                .try_iter()
                .map(|chunk| chunk.len())
                .sum::<usize>();
        self.pending.clear();
        if dropped > 0 {
            tracing::debug!("Discarded {} stale bytes", dropped);
        }
        Ok(())
    }
}

struct MemoryWriter {
    outbound: Sender<Vec<u8>>,
}

impl CommandWriter for MemoryWriter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.outbound
            .send(bytes.to_vec())
            .map_err(|_| ScopeError::TransportWrite("memory feed dropped".to_string()))
    }
}
