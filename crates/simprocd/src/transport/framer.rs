//! Newline-delimited framing over a byte stream.
//!
//! A frame is every byte up to a single `\n`. The terminator is stripped on
//! receive and appended on send. Bytes read past a terminator are kept for the
//! next call, so clients may write several commands back to back.

use std::io::{self, Read, Write};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::LISTENER_TARGET;

/// Upper bound on a single line, excluding its terminator.
pub(crate) const MAX_LINE_BYTES: usize = 1024 * 1024;

const READ_CHUNK_BYTES: usize = 4096;

/// Transport failures that end a connection.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Reading from or writing to the socket failed.
    #[error("connection I/O failed: {0}")]
    Io(#[from] io::Error),
    /// A line grew past the size limit without a terminator.
    #[error("line exceeds {max_bytes} byte limit")]
    LineTooLong {
        /// Configured limit in bytes.
        max_bytes: usize,
    },
    /// A reply could not be encoded.
    #[error("failed to serialise reply: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Line reader and writer bound to one connection.
#[derive(Debug)]
pub struct LineFramer<S> {
    stream: S,
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no terminator.
    scanned: usize,
    max_line_bytes: usize,
}

impl<S> LineFramer<S>
where
    S: Read + Write,
{
    /// Frames `stream` with the default line limit.
    #[must_use]
    pub fn new(stream: S) -> Self {
        Self::with_limit(stream, MAX_LINE_BYTES)
    }

    /// Frames `stream` with a custom line limit.
    #[must_use]
    pub const fn with_limit(stream: S, max_line_bytes: usize) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            scanned: 0,
            max_line_bytes,
        }
    }

    /// Reads the next line without its terminator.
    ///
    /// Returns `Ok(None)` once the peer has closed the stream. A trailing
    /// partial line (bytes without a terminator before end of stream) is
    /// discarded and also reported as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Io`] for socket failures other than interrupts,
    /// which are retried, and [`FrameError::LineTooLong`] when a line exceeds
    /// the limit.
    pub fn receive_line(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let mut chunk = [0_u8; READ_CHUNK_BYTES];
        loop {
            if let Some(position) = self.find_terminator() {
                if position > self.max_line_bytes {
                    return Err(self.too_long());
                }
                let mut line: Vec<u8> = self.buffer.drain(..=position).collect();
                line.pop();
                self.scanned = 0;
                return Ok(Some(line));
            }
            if self.buffer.len() > self.max_line_bytes {
                return Err(self.too_long());
            }

            let bytes_read = read_with_retry(&mut self.stream, &mut chunk)?;
            if bytes_read == 0 {
                if !self.buffer.is_empty() {
                    debug!(
                        target: LISTENER_TARGET,
                        discarded_bytes = self.buffer.len(),
                        "peer closed mid-line"
                    );
                    self.buffer.clear();
                    self.scanned = 0;
                }
                return Ok(None);
            }
            self.buffer
                .extend_from_slice(chunk.get(..bytes_read).unwrap_or_default());
        }
    }

    /// Writes `line` followed by a terminator and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Io`] when the write fails.
    pub fn send_line(&mut self, line: &[u8]) -> Result<(), FrameError> {
        let mut framed = Vec::with_capacity(line.len() + 1);
        framed.extend_from_slice(line);
        framed.push(b'\n');
        // `write_all` already retries `Interrupted`.
        self.stream.write_all(&framed)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Serialises `reply` compactly and sends it as one line.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Serialize`] or [`FrameError::Io`].
    pub fn send_value(&mut self, reply: &Value) -> Result<(), FrameError> {
        let encoded = serde_json::to_vec(reply)?;
        self.send_line(&encoded)
    }

    /// Releases the underlying stream.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Searches only the bytes appended since the last unsuccessful scan.
    fn find_terminator(&mut self) -> Option<usize> {
        let unscanned = self.buffer.get(self.scanned..).unwrap_or_default();
        match unscanned.iter().position(|byte| *byte == b'\n') {
            Some(offset) => Some(self.scanned + offset),
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    fn too_long(&mut self) -> FrameError {
        self.buffer.clear();
        self.scanned = 0;
        FrameError::LineTooLong {
            max_bytes: self.max_line_bytes,
        }
    }
}

fn read_with_retry<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
}
