use std::time::Duration;

use motolink_frame::{ParserConfig, DEFAULT_MAX_PAYLOAD};
use motolink_protocol::SignConventions;

/// Driver behavior configuration.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// How long to wait for the ready frame after opening the link.
    pub handshake_timeout: Duration,
    /// Upper bound on waiting for target reached; `None` waits forever.
    pub completion_timeout: Option<Duration>,
    /// Delay after a soft stop before it counts as complete.
    pub settle_delay: Duration,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Largest outbound payload.
    pub max_payload_size: usize,
    /// Inbound stream parser settings.
    pub parser: ParserConfig,
    /// Direction-byte mapping per opcode.
    pub sign_conventions: SignConventions,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(5),
            completion_timeout: Some(Duration::from_secs(30)),
            settle_delay: Duration::from_millis(500),
            event_capacity: 64,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            parser: ParserConfig::default(),
            sign_conventions: SignConventions::default(),
        }
    }
}
