use std::time::Duration;

use motolink_frame::{FrameError, FrameReader, FrameWriter};
use motolink_protocol::{classify, Event};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::error::InitError;

/// Flush the freshly opened link and wait for the controller's ready frame.
///
/// Frames that arrive before ready (stale telemetry from a previous session)
/// are skipped.
pub async fn handshake<R, W>(
    reader: &mut FrameReader<R>,
    writer: &mut FrameWriter<W>,
    timeout: Duration,
) -> Result<(), InitError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer.flush().await?;

    match tokio::time::timeout(timeout, wait_for_ready(reader)).await {
        Ok(result) => result,
        Err(_) => Err(InitError::HandshakeTimeout(timeout)),
    }
}

async fn wait_for_ready<R: AsyncRead + Unpin>(reader: &mut FrameReader<R>) -> Result<(), InitError> {
    loop {
        match reader.read_frame().await {
            Ok(frame) => match classify(&frame) {
                Event::Ready => return Ok(()),
                other => debug!(event = other.name(), "skipping frame before ready"),
            },
            Err(FrameError::ConnectionClosed) => return Err(InitError::Closed),
            Err(err) => return Err(InitError::Frame(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use motolink_frame::encode;
    use motolink_protocol::{TAG_ODOMETRY, TAG_READY};
    use tokio::io::AsyncWriteExt;

    use super::*;

    #[tokio::test]
    async fn successful_handshake() {
        let (host, mut controller) = tokio::io::duplex(64);
        let (rx, tx) = tokio::io::split(host);
        let mut reader = FrameReader::new(rx);
        let mut writer = FrameWriter::new(tx);

        controller
            .write_all(&encode(&[0xA4, TAG_READY]))
            .await
            .unwrap();

        handshake(&mut reader, &mut writer, Duration::from_secs(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn skips_frames_before_ready() {
        let (host, mut controller) = tokio::io::duplex(64);
        let (rx, tx) = tokio::io::split(host);
        let mut reader = FrameReader::new(rx);
        let mut writer = FrameWriter::new(tx);

        let mut wire = Vec::new();
        wire.extend_from_slice(&[0x55, 0x00]);
        wire.extend_from_slice(&encode(&[0xA4, TAG_ODOMETRY, 1, 1, 1, 1, 0, 0]));
        wire.extend_from_slice(&encode(&[0xA4, TAG_READY]));
        controller.write_all(&wire).await.unwrap();

        handshake(&mut reader, &mut writer, Duration::from_secs(1))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn handshake_timeout() {
        let (host, _controller) = tokio::io::duplex(64);
        let (rx, tx) = tokio::io::split(host);
        let mut reader = FrameReader::new(rx);
        let mut writer = FrameWriter::new(tx);

        let result = handshake(&mut reader, &mut writer, Duration::from_millis(250)).await;
        assert!(matches!(result, Err(InitError::HandshakeTimeout(_))));
    }

    #[tokio::test]
    async fn closed_during_handshake() {
        let (host, controller) = tokio::io::duplex(64);
        drop(controller);
        let (rx, tx) = tokio::io::split(host);
        let mut reader = FrameReader::new(rx);
        let mut writer = FrameWriter::new(tx);

        let result = handshake(&mut reader, &mut writer, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(InitError::Closed)));
    }
}
