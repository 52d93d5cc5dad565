use motolink_protocol::Odometry;
use serde::Serialize;

/// Notifications published to [`crate::Driver::subscribe`] receivers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DriverEvent {
    /// Handshake completed; sent once per connection.
    Ready,
    /// Odometry sample, published as soon as it is decoded.
    Odometry(Odometry),
    /// The controller reached the target of the last distance/angle command.
    TargetReached,
    /// Transport error observed by the reader.
    Error { message: String },
    /// The link was closed, by the peer or by [`crate::Driver::close`].
    Close,
    /// The link dropped (unplugged adapter, reset connection).
    Disconnect,
}

impl DriverEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Odometry(_) => "odometry",
            Self::TargetReached => "target_reached",
            Self::Error { .. } => "error",
            Self::Close => "close",
            Self::Disconnect => "disconnect",
        }
    }

    /// Whether the event ends the connection.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Close | Self::Disconnect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let json = serde_json::to_value(DriverEvent::Odometry(Odometry {
            left_ticks: 3,
            right_ticks: -3,
            heading: 12.5,
        }))
        .expect("event should serialize");

        assert_eq!(json["event"], "odometry");
        assert_eq!(json["left_ticks"], 3);
        assert_eq!(json["right_ticks"], -3);
        assert_eq!(json["heading"], 12.5);

        let json = serde_json::to_value(DriverEvent::Error {
            message: "boom".to_string(),
        })
        .expect("event should serialize");
        assert_eq!(json["event"], "error");
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn terminal_events() {
        assert!(DriverEvent::Close.is_terminal());
        assert!(DriverEvent::Disconnect.is_terminal());
        assert!(!DriverEvent::TargetReached.is_terminal());
        assert_eq!(DriverEvent::TargetReached.name(), "target_reached");
    }
}
