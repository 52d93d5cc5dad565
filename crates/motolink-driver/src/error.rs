use std::time::Duration;

/// Errors raised while bringing a link up.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// A connection is already open or being opened.
    #[error("connection already open")]
    AlreadyOpen,

    /// The controller did not report ready in time.
    #[error("no ready frame within {0:?}")]
    HandshakeTimeout(Duration),

    /// The link ended before the controller reported ready.
    #[error("link closed during handshake")]
    Closed,

    /// Frame-level error during the handshake.
    #[error("frame error: {0}")]
    Frame(#[from] motolink_frame::FrameError),
}

/// Errors that can occur in driver operations.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Initialization failed.
    #[error("initialization failed: {0}")]
    Init(#[from] InitError),

    /// Frame-level error while writing a command.
    #[error("frame error: {0}")]
    Frame(#[from] motolink_frame::FrameError),

    /// The link refused a command write.
    #[error("transport error: {0}")]
    Transport(#[from] motolink_transport::TransportError),

    /// No open connection.
    #[error("not connected")]
    NotConnected,

    /// Another distance/angle command is still awaiting completion.
    #[error("a distance/angle command is already awaiting completion")]
    CompletionPending,

    /// The target-reached notification did not arrive in time.
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    /// The pending completion was cancelled.
    #[error("completion cancelled")]
    Cancelled,

    /// The link closed while a completion was pending.
    #[error("link closed before completion")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, DriverError>;
