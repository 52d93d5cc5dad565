//! Async driver for a motolink motion controller.
//!
//! This is the "just works" layer: hand it a byte transport, await the ready
//! handshake, then issue motion commands and await their completion.
//!
//! Only one distance/angle command may be awaiting completion at a time. The
//! controller's target-reached notification carries no command identity, so
//! a second such command is rejected with [`DriverError::CompletionPending`]
//! until the first resolves or is cancelled.

pub mod completion;
pub mod config;
pub mod correlator;
pub mod driver;
pub mod error;
pub mod event;
pub mod handshake;

pub use completion::{Completion, PendingCompletion};
pub use config::DriverConfig;
pub use correlator::{Correlator, Subscription};
pub use driver::Driver;
pub use error::{DriverError, InitError, Result};
pub use event::DriverEvent;
pub use handshake::handshake;
