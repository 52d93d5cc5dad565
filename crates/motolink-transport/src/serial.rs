use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::{ReadHalf, WriteHalf};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::ByteTransport;

/// Line rate used when none is given.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// A serial port opened in raw mode (8N1, no flow control).
///
/// Raw mode matters: with the default line discipline the tty would echo
/// controller bytes back and hold frames until a newline arrives.
pub struct SerialDevice {
    path: PathBuf,
    stream: SerialStream,
}

impl fmt::Debug for SerialDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialDevice").field("path", &self.path).finish_non_exhaustive()
    }
}

impl SerialDevice {
    /// Open a device node at `baud_rate`.
    ///
    /// Must be called from within a Tokio runtime; the port is registered
    /// with the reactor and never blocks a worker thread.
    pub fn open(path: impl AsRef<Path>, baud_rate: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let stream = tokio_serial::new(path.to_string_lossy(), baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open_native_async()
            .map_err(|err| TransportError::Open {
                path: path.clone(),
                source: err.into(),
            })?;

        info!(?path, baud_rate, "opened serial device");
        Ok(Self { path, stream })
    }

    /// Path of the opened device node.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteTransport for SerialDevice {
    type Reader = ReadHalf<SerialStream>;
    type Writer = WriteHalf<SerialStream>;

    fn into_split(self) -> (Self::Reader, Self::Writer) {
        debug!(path = ?self.path, "splitting serial device");
        tokio::io::split(self.stream)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Connect to a Unix domain socket (simulators and pty bridges).
#[cfg(unix)]
pub async fn connect_unix(path: impl AsRef<Path>) -> Result<tokio::net::UnixStream> {
    let path = path.as_ref();
    let stream = tokio::net::UnixStream::connect(path)
        .await
        .map_err(|source| TransportError::Connect {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(?path, "connected to unix socket");
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "motolink-transport-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[tokio::test]
    async fn open_missing_device_fails() {
        let dir = unique_temp_dir("missing");
        let path = dir.join("ttyNOPE");
        let err = SerialDevice::open(&path, DEFAULT_BAUD_RATE).unwrap_err();
        match err {
            TransportError::Open {
                path: reported,
                source,
            } => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn regular_file_is_not_a_serial_port() {
        let dir = unique_temp_dir("regular");
        let path = dir.join("fake-tty");
        std::fs::write(&path, b"").unwrap();

        let err = SerialDevice::open(&path, DEFAULT_BAUD_RATE).unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn pty_passes_binary_frames_without_echo() {
        use std::time::Duration;

        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (controller, port) = SerialStream::pair().expect("pty pair should open");
        let device = SerialDevice {
            path: PathBuf::from("pty"),
            stream: port,
        };
        assert_eq!(device.describe(), "pty");
        let (mut rx, _tx) = device.into_split();
        let (mut controller_rx, mut controller_tx) = tokio::io::split(controller);

        // A ready frame with no trailing newline.
        controller_tx.write_all(&[0x03, 0xA4, 0x01, 0x00]).await.unwrap();
        let mut buf = [0u8; 4];
        tokio::time::timeout(Duration::from_secs(2), rx.read_exact(&mut buf))
            .await
            .expect("frame should arrive without a newline")
            .unwrap();
        assert_eq!(buf, [0x03, 0xA4, 0x01, 0x00]);

        let mut echo = [0u8; 8];
        let echoed = tokio::time::timeout(Duration::from_millis(100), controller_rx.read(&mut echo)).await;
        assert!(echoed.is_err(), "port echoed bytes back to the controller");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn connect_unix_reports_path_on_failure() {
        let dir = unique_temp_dir("connect");
        let path = dir.join("absent.sock");
        let err = connect_unix(&path).await.unwrap_err();
        match err {
            TransportError::Connect { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
