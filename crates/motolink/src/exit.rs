use std::fmt;
use std::io;

use motolink_driver::{DriverError, InitError};
use motolink_frame::FrameError;
use motolink_transport::{is_disconnect, TransportError};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERRUPTED: i32 = 130;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => TRANSPORT_ERROR,
        _ if is_disconnect(&err) => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Io(source) => io_error(context, source),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } | FrameError::Malformed { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn init_error(context: &str, err: InitError) -> CliError {
    match err {
        InitError::Frame(err) => frame_error(context, err),
        InitError::HandshakeTimeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        InitError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
        InitError::AlreadyOpen => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

pub fn driver_error(context: &str, err: DriverError) -> CliError {
    match err {
        DriverError::Init(err) => init_error(context, err),
        DriverError::Frame(err) => frame_error(context, err),
        DriverError::Transport(err) => transport_error(context, err),
        DriverError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        DriverError::Cancelled => CliError::new(INTERRUPTED, format!("{context}: {err}")),
        DriverError::Disconnected | DriverError::NotConnected => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        DriverError::CompletionPending => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn handshake_timeout_maps_to_timeout_code() {
        let err = driver_error(
            "handshake failed",
            DriverError::Init(InitError::HandshakeTimeout(Duration::from_secs(5))),
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("handshake failed: "));
    }

    #[test]
    fn refused_write_maps_to_transport_code() {
        let err = driver_error(
            "drive failed",
            DriverError::Transport(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "write refused",
            ))),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn missing_device_maps_to_transport_code() {
        let err = transport_error(
            "open failed",
            TransportError::Open {
                path: "/dev/ttyNOPE".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn completion_errors_map_distinctly() {
        assert_eq!(
            driver_error("drive", DriverError::Timeout(Duration::from_secs(1))).code,
            TIMEOUT
        );
        assert_eq!(driver_error("drive", DriverError::Cancelled).code, INTERRUPTED);
        assert_eq!(driver_error("drive", DriverError::Disconnected).code, FAILURE);
    }
}
