//! Transport traits for the acquisition core
//!
//! The core never opens ports itself beyond [`crate::backend::SerialTransport`];
//! it only needs a way to read exact frames and a way to write commands.
//! A [`Transport`] is split once into its two halves so the read half can
//! move onto the acquisition thread while the write half stays with the
//! command sink:
//!
//! - [`FrameReader`] - exact-length reads, input flush, release
//! - [`CommandWriter`] - synchronous byte writes
//!
//! Implementations must be `Send`. Concurrent use of the two halves is only
//! sound if the underlying device supports simultaneous read and write,
//! which serial ports do.

use crate::error::{Result, ScopeError};
use std::io::{ErrorKind, Read};
use std::time::Duration;

/// Read half of a transport, owned by the acquisition loop
pub trait FrameReader: Send {
    /// Fill `buf` completely.
    ///
    /// Must either fill the whole buffer or return an error, never a silent
    /// short read:
    /// - [`ScopeError::ReadTimeout`] if nothing arrived within the read timeout
    /// - [`ScopeError::ShortRead`] if the frame was only partially received
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Discard any bytes already buffered by the transport
    fn discard_input(&mut self) -> Result<()>;

    /// Release the read side. Called once when the loop stops.
    fn close(&mut self) {}
}

/// Write half of a transport, owned by the command sink
#[cfg_attr(test, mockall::automock)]
pub trait CommandWriter: Send {
    /// Write all bytes synchronously
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;
}

/// An opened transport that can be divided into read and write halves
pub trait Transport: Send {
    /// Human-readable address (port name, "memory", ...)
    fn address(&self) -> &str;

    /// Split into independently owned halves
    fn split(self: Box<Self>) -> Result<(Box<dyn FrameReader>, Box<dyn CommandWriter>)>;
}

/// Read exactly `buf.len()` bytes from a blocking reader with a read timeout.
///
/// A timeout before the first byte maps to [`ScopeError::ReadTimeout`]; a
/// timeout or end-of-stream after a partial frame maps to
/// [`ScopeError::ShortRead`]. Interrupted reads are retried.
pub fn read_frame<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    timeout: Duration,
) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Err(ScopeError::Read("end of stream".to_string()));
                }
                return Err(ScopeError::ShortRead {
                    expected: buf.len(),
                    actual: filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                if filled == 0 {
                    return Err(ScopeError::ReadTimeout(timeout));
                }
                return Err(ScopeError::ShortRead {
                    expected: buf.len(),
                    actual: filled,
                });
            }
            Err(e) => return Err(ScopeError::Read(e.to_string())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Reader that replays scripted chunks and errors
    struct ScriptedRead(VecDeque<io::Result<Vec<u8>>>);

    impl Read for ScriptedRead {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(chunk)) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
            }
        }
    }

    fn timed_out() -> io::Result<Vec<u8>> {
        Err(io::Error::new(ErrorKind::TimedOut, "timed out"))
    }

    #[test]
    fn test_reads_across_chunks() {
        let mut reader = ScriptedRead(VecDeque::from(vec![Ok(vec![1, 2]), Ok(vec![3, 4])]));
        let mut buf = [0u8; 4];
        read_frame(&mut reader, &mut buf, Duration::from_millis(10)).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_timeout_before_first_byte_is_idle() {
        let mut reader = ScriptedRead(VecDeque::from(vec![timed_out()]));
        let mut buf = [0u8; 4];
        let err = read_frame(&mut reader, &mut buf, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, ScopeError::ReadTimeout(_)));
    }

    #[test]
    fn test_timeout_mid_frame_is_short_read() {
        let mut reader = ScriptedRead(VecDeque::from(vec![Ok(vec![1]), timed_out()]));
        let mut buf = [0u8; 4];
        let err = read_frame(&mut reader, &mut buf, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(
            err,
            ScopeError::ShortRead {
                expected: 4,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_eof_mid_frame_is_short_read() {
        let mut reader = &[9u8, 9, 9][..];
        let mut buf = [0u8; 4];
        let err = read_frame(&mut reader, &mut buf, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(
            err,
            ScopeError::ShortRead {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_interrupted_is_retried() {
        let mut reader = ScriptedRead(VecDeque::from(vec![
            Err(io::Error::new(ErrorKind::Interrupted, "signal")),
            Ok(vec![5, 6]),
        ]));
        let mut buf = [0u8; 2];
        read_frame(&mut reader, &mut buf, Duration::from_millis(10)).unwrap();
        assert_eq!(buf, [5, 6]);
    }

    #[test]
    fn test_other_errors_are_read_errors() {
        let mut reader = ScriptedRead(VecDeque::from(vec![Err(io::Error::new(
            ErrorKind::BrokenPipe,
            "unplugged",
        ))]));
        let mut buf = [0u8; 2];
        let err = read_frame(&mut reader, &mut buf, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, ScopeError::Read(_)));
    }
}
