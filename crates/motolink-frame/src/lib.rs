//! Self-synchronizing framing for motolink serial links.
//!
//! Every frame on the wire is COBS-encoded and terminated by a single `0x00`
//! delimiter:
//! - the delimiter never appears inside an encoded frame
//! - a receiver that joins mid-stream resynchronizes at the next delimiter
//! - no length prefix, so a corrupted byte costs at most one frame
//!
//! [`StreamParser`] turns arbitrary read chunks into decoded frames; the
//! `async` feature adds [`FrameReader`] and [`FrameWriter`] over tokio I/O.

pub mod codec;
pub mod error;
pub mod parser;
#[cfg(feature = "async")]
pub mod reader;
#[cfg(feature = "async")]
pub mod writer;

pub use codec::{
    decode, encode, encode_frame, max_encoded_len, Frame, DEFAULT_MAX_PAYLOAD, DELIMITER,
};
pub use error::{FrameError, Result};
pub use parser::{ParserConfig, ParserState, ParserStats, StreamParser, DEFAULT_MAX_FRAME_LEN};
#[cfg(feature = "async")]
pub use reader::FrameReader;
#[cfg(feature = "async")]
pub use writer::FrameWriter;
