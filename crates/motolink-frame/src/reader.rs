use std::collections::VecDeque;
use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec::Frame;
use crate::error::{FrameError, Result};
use crate::parser::{ParserConfig, ParserStats, StreamParser};

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete frames from any `AsyncRead` byte source.
///
/// Handles partial reads internally; callers always get complete frames.
/// Malformed frames are dropped by the parser and never surface here.
///
/// `read_frame` is cancel safe: frames already parsed stay queued and bytes
/// are only consumed once a read completes.
pub struct FrameReader<T> {
    inner: T,
    parser: StreamParser,
    ready: VecDeque<Frame>,
}

impl<T: AsyncRead + Unpin> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ParserConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: ParserConfig) -> Self {
        Self {
            inner,
            parser: StreamParser::with_config(config),
            ready: VecDeque::new(),
        }
    }

    /// Read the next complete frame.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub async fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk).await {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.parser.feed_into(&chunk[..read], &mut self.ready);
        }
    }

    /// Parser counters.
    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
