//! Host-side driver for COBS-framed serial motion controllers.
//!
//! motolink talks to a small differential-drive controller over a serial
//! link: it encodes motion commands, reassembles framed telemetry from the
//! byte stream, and pairs distance/angle commands with the controller's
//! target-reached notifications.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte links (raw serial ports, Unix sockets)
//! - [`frame`]: COBS framing and the resynchronizing stream parser
//! - [`protocol`]: command encoding and inbound frame classification
//! - [`driver`]: handshake, command issue and completion tracking
//!
//! # Example
//!
//! ```no_run
//! use motolink::driver::{Driver, DriverConfig};
//! use motolink::transport::{SerialDevice, DEFAULT_BAUD_RATE};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = Driver::new(DriverConfig::default());
//! driver.init(SerialDevice::open("/dev/ttyUSB0", DEFAULT_BAUD_RATE)?).await?;
//!
//! driver.forward(40, 100).await?.wait().await?;
//! driver.rotate(30, -90).await?.wait().await?;
//! driver.stop(false).await?.wait().await?;
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use motolink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use motolink_frame::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use motolink_protocol::*;
}

/// Re-export driver types.
pub mod driver {
    pub use motolink_driver::*;
}
