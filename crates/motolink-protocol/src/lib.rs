//! The motolink wire protocol.
//!
//! Outbound, every motion primitive becomes `[START_MARKER, opcode, args...]`
//! with one unsigned byte per argument. Inbound, a decoded frame is
//! `[marker, tag, body...]` and the tag selects ready, odometry or
//! target-reached.

pub mod command;
pub mod event;
pub mod telemetry;

pub use command::{
    magnitude, Command, CommandEncoder, CompletionKind, Opcode, SignConvention, SignConventions,
    START_MARKER,
};
pub use event::{classify, Event, TAG_ODOMETRY, TAG_READY, TAG_TARGET_REACHED};
pub use telemetry::{decode_odometry, parse_fixed_point, signed_ticks, Odometry};
