use std::io::ErrorKind;

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::codec::{encode_frame, max_encoded_len, Frame, DEFAULT_MAX_PAYLOAD};
use crate::error::{FrameError, Result};

/// Writes complete frames to any `AsyncWrite` byte sink.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    max_payload_size: usize,
}

impl<T: AsyncWrite + Unpin> FrameWriter<T> {
    /// Create a new frame writer with the default payload limit.
    pub fn new(inner: T) -> Self {
        Self::with_max_payload(inner, DEFAULT_MAX_PAYLOAD)
    }

    /// Create a new frame writer with an explicit payload limit.
    pub fn with_max_payload(inner: T, max_payload_size: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(max_encoded_len(max_payload_size)),
            max_payload_size,
        }
    }

    /// Write a complete frame.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.payload.as_ref()).await
    }

    /// Encode a payload, write it and flush.
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload_size,
            });
        }

        self.buf.clear();
        encode_frame(payload, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]).await {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush().await
    }

    /// Flush the underlying stream.
    pub async fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush().await {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};

    use super::*;
    use crate::codec::decode;
    use crate::parser::StreamParser;

    #[tokio::test]
    async fn write_single_frame() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send(&[0xA3, 0x10, 20, 100]).await.unwrap();

        let wire = writer.into_inner();
        assert_eq!(wire.last(), Some(&0x00));
        assert_eq!(decode(&wire).unwrap().as_ref(), &[0xA3, 0x10, 20, 100]);
    }

    #[tokio::test]
    async fn write_multiple_frames() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send(&[0xA3, 0x15, 0]).await.unwrap();
        writer.write_frame(&Frame::new(vec![0xA3, 0x20])).await.unwrap();

        let wire = writer.into_inner();
        let frames = StreamParser::new().feed(&wire);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].payload.as_ref(), &[0xA3, 0x15, 0]);
        assert_eq!(frames[1].payload.as_ref(), &[0xA3, 0x20]);
    }

    #[tokio::test]
    async fn payload_too_large_rejected() {
        let mut writer = FrameWriter::with_max_payload(Vec::<u8>::new(), 4);
        let err = writer.send(b"oversized").await.unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert!(writer.get_ref().is_empty());
    }

    #[tokio::test]
    async fn flush_propagates() {
        let flushed = Arc::new(AtomicBool::new(false));
        let mut writer = FrameWriter::new(FlushTrackingWriter {
            flushed: Arc::clone(&flushed),
        });

        writer.send(&[0xA3, 0x20]).await.unwrap();
        assert!(flushed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(&[0xA3, 0x20]).await.unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
    }

    impl AsyncWrite for FlushTrackingWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            self.flushed.store(true, Ordering::SeqCst);
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    struct ZeroWriter;

    impl AsyncWrite for ZeroWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Ok(0))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }
}
