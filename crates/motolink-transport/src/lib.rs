//! Byte transport abstraction for motolink.
//!
//! The protocol layers only ever see a byte source and a byte sink. This crate
//! provides the [`ByteTransport`] seam that splits a full-duplex link into
//! those two halves, plus openers for the links used in practice:
//! - serial ports (`/dev/ttyUSB0`, `/dev/ttyACM0`, ptys), opened raw at 8N1
//!   through `tokio-serial`
//! - Unix domain sockets (firmware simulators)

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{is_disconnect, Result, TransportError};
pub use serial::{SerialDevice, DEFAULT_BAUD_RATE};
pub use traits::ByteTransport;

#[cfg(unix)]
pub use serial::connect_unix;
