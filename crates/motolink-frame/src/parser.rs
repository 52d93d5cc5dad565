use bytes::BytesMut;
use tracing::{debug, trace, warn};

use crate::codec::{decode, Frame, DELIMITER};

/// Default bound on the encoded size of a single frame.
pub const DEFAULT_MAX_FRAME_LEN: usize = 512;

/// Configuration for the stream parser.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum encoded frame length before accumulation is abandoned.
    pub max_frame_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

/// Receive-side state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Buffer empty, waiting for the first byte of a frame.
    AwaitingDelimiter,
    /// Collecting the bytes of a frame until the next delimiter.
    AccumulatingFrame,
    /// Frame exceeded `max_frame_len`; dropping bytes until the next delimiter.
    Discarding,
}

/// Running counters kept by the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Frames decoded successfully.
    pub frames: u64,
    /// Frames dropped as malformed or oversized.
    pub malformed: u64,
    /// Bytes thrown away while resynchronizing.
    pub discarded_bytes: u64,
}

/// Reassembles frames from an unreliable byte stream.
///
/// Bytes may arrive in chunks of any size; partial frames are kept across
/// calls to [`StreamParser::feed`]. Corrupted frames are dropped and the parser
/// resynchronizes at the next delimiter, so noise on the line never ends the
/// stream.
#[derive(Debug)]
pub struct StreamParser {
    buf: BytesMut,
    state: ParserState,
    config: ParserConfig,
    stats: ParserStats,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamParser {
    /// Create a parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser with explicit configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.max_frame_len),
            state: ParserState::AwaitingDelimiter,
            config,
            stats: ParserStats::default(),
        }
    }

    /// Feed raw bytes and collect every frame they complete.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        self.feed_into(data, &mut frames);
        frames
    }

    /// Feed raw bytes, appending completed frames to `out`.
    pub fn feed_into<E: Extend<Frame>>(&mut self, data: &[u8], out: &mut E) {
        let mut rest = data;
        while !rest.is_empty() {
            match rest.iter().position(|&b| b == DELIMITER) {
                Some(idx) => {
                    self.absorb(&rest[..idx]);
                    if let Some(frame) = self.close_frame() {
                        out.extend(Some(frame));
                    }
                    rest = &rest[idx + 1..];
                }
                None => {
                    self.absorb(rest);
                    break;
                }
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Counters since creation.
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Bytes of the frame currently being accumulated.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial frame and return to the idle state.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = ParserState::AwaitingDelimiter;
    }

    fn absorb(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        match self.state {
            ParserState::Discarding => {
                self.stats.discarded_bytes += bytes.len() as u64;
            }
            ParserState::AwaitingDelimiter | ParserState::AccumulatingFrame => {
                let total = self.buf.len() + bytes.len();
                if total > self.config.max_frame_len {
                    warn!(
                        len = total,
                        max = self.config.max_frame_len,
                        "frame exceeds maximum length, discarding until next delimiter"
                    );
                    self.stats.discarded_bytes += total as u64;
                    self.buf.clear();
                    self.state = ParserState::Discarding;
                } else {
                    self.buf.extend_from_slice(bytes);
                    self.state = ParserState::AccumulatingFrame;
                }
            }
        }
    }

    fn close_frame(&mut self) -> Option<Frame> {
        match self.state {
            ParserState::AwaitingDelimiter => {
                trace!("delimiter with empty buffer, resynchronized");
                None
            }
            ParserState::Discarding => {
                self.stats.malformed += 1;
                self.state = ParserState::AwaitingDelimiter;
                None
            }
            ParserState::AccumulatingFrame => {
                let raw = self.buf.split();
                self.state = ParserState::AwaitingDelimiter;
                match decode(&raw) {
                    Ok(payload) => {
                        self.stats.frames += 1;
                        debug!(len = payload.len(), "frame decoded");
                        Some(Frame::new(payload))
                    }
                    Err(err) => {
                        self.stats.malformed += 1;
                        warn!(%err, len = raw.len(), "dropping malformed frame");
                        None
                    }
                }
            }
        }
    }
}
