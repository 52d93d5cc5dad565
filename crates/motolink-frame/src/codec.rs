use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Reserved boundary byte. Never appears inside an encoded frame.
pub const DELIMITER: u8 = 0x00;

/// Default maximum payload size accepted by writers.
pub const DEFAULT_MAX_PAYLOAD: usize = 256;

/// A decoded frame.
///
/// The first payload byte is the request/response marker and the second is
/// the message-type tag; everything after is message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The decoded payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Request/response marker byte, if present.
    pub fn marker(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// Message-type tag, if present.
    pub fn tag(&self) -> Option<u8> {
        self.payload.get(1).copied()
    }

    /// Message body following marker and tag.
    pub fn body(&self) -> &[u8] {
        self.payload.get(2..).unwrap_or(&[])
    }

    /// The total wire size of this frame (stuffed bytes + delimiter).
    pub fn wire_size(&self) -> usize {
        let mut buf = BytesMut::new();
        encode_frame(&self.payload, &mut buf);
        buf.len()
    }
}

/// Worst-case encoded size for a payload, delimiter included.
pub fn max_encoded_len(payload_len: usize) -> usize {
    payload_len + payload_len / 254 + 2
}

/// Encode a payload into the wire format and append it to `dst`.
///
/// Wire format (COBS):
/// ```text
/// ┌──────┬──────────────┬──────┬──────────────┬─────┬──────┐
/// │ code │ code-1 bytes │ code │ code-1 bytes │ ... │ 0x00 │
/// └──────┴──────────────┴──────┴──────────────┴─────┴──────┘
/// ```
/// Each code byte gives the distance to the next code byte; a code below
/// `0xFF` stands for a zero byte in the payload at that position.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) {
    let start = dst.len();
    dst.resize(start + max_encoded_len(payload.len()) - 1, 0);
    let written = cobs::encode(payload, &mut dst[start..]);
    dst.truncate(start + written);
    dst.put_u8(DELIMITER);
}

/// Encode a payload into a standalone wire buffer.
pub fn encode(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::new();
    encode_frame(payload, &mut buf);
    buf.freeze()
}

/// Decode one encoded frame back into its payload.
///
/// A single trailing delimiter is accepted. Corrupted input is reported as
/// [`FrameError::Malformed`] and never panics.
pub fn decode(framed: &[u8]) -> Result<Bytes> {
    let body = match framed.split_last() {
        Some((&DELIMITER, rest)) => rest,
        _ => framed,
    };
    if body.is_empty() {
        return Err(FrameError::Malformed {
            reason: "empty frame",
        });
    }
    // The decoder would stop early at a delimiter and return a truncated payload.
    if body.contains(&DELIMITER) {
        return Err(FrameError::Malformed {
            reason: "delimiter inside frame",
        });
    }

    let mut terminated = Vec::with_capacity(body.len() + 1);
    terminated.extend_from_slice(body);
    terminated.push(DELIMITER);

    let mut out = vec![0u8; body.len()];
    let len = cobs::decode(&terminated, &mut out).map_err(|_| FrameError::Malformed {
        reason: "code byte overruns frame",
    })?;
    out.truncate(len);
    Ok(Bytes::from(out))
}
