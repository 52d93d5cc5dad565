use motolink_frame::Frame;
use serde::Serialize;
use tracing::warn;

use crate::telemetry::{decode_odometry, Odometry, ODOMETRY_PAYLOAD_LEN};

/// Controller finished its power-up handshake.
pub const TAG_READY: u8 = 0x01;
/// Odometry sample follows.
pub const TAG_ODOMETRY: u8 = 0x02;
/// The last distance/angle command reached its target.
pub const TAG_TARGET_REACHED: u8 = 0x03;

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Ready,
    Odometry(Odometry),
    TargetReached,
    /// Unrecognized tag or a frame too short to carry one.
    Unknown {
        marker: Option<u8>,
        tag: Option<u8>,
        len: usize,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Odometry(_) => "odometry",
            Self::TargetReached => "target_reached",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// Classify a decoded frame by its type tag.
///
/// Unknown frames are logged and returned as [`Event::Unknown`]; callers
/// are expected to ignore them.
pub fn classify(frame: &Frame) -> Event {
    match frame.tag() {
        Some(TAG_READY) => Event::Ready,
        Some(TAG_ODOMETRY) => {
            if frame.body().len() != ODOMETRY_PAYLOAD_LEN {
                warn!(
                    len = frame.body().len(),
                    expected = ODOMETRY_PAYLOAD_LEN,
                    "odometry payload has unexpected length"
                );
            }
            Event::Odometry(decode_odometry(frame.body()))
        }
        Some(TAG_TARGET_REACHED) => Event::TargetReached,
        tag => {
            warn!(
                marker = ?frame.marker(),
                tag = ?tag,
                len = frame.payload.len(),
                "ignoring unknown frame"
            );
            Event::Unknown {
                marker: frame.marker(),
                tag,
                len: frame.payload.len(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_tags() {
        assert_eq!(classify(&Frame::new(vec![0xA4, TAG_READY])), Event::Ready);
        assert_eq!(
            classify(&Frame::new(vec![0xA4, TAG_TARGET_REACHED])),
            Event::TargetReached
        );

        let odometry = classify(&Frame::new(vec![0xA4, TAG_ODOMETRY, 1, 10, 0, 5, 0x23, 0x28]));
        match odometry {
            Event::Odometry(odo) => {
                assert_eq!(odo.left_ticks, 10);
                assert_eq!(odo.right_ticks, -5);
                assert!((odo.heading - 90.0).abs() < 1e-9);
            }
            other => panic!("expected odometry, got {other:?}"),
        }
    }

    #[test]
    fn marker_is_not_validated() {
        assert_eq!(classify(&Frame::new(vec![0x00, TAG_READY])), Event::Ready);
    }

    #[test]
    fn unknown_and_runt_frames() {
        assert_eq!(
            classify(&Frame::new(vec![0xA4, 0x7E, 1])),
            Event::Unknown {
                marker: Some(0xA4),
                tag: Some(0x7E),
                len: 3
            }
        );
        assert_eq!(
            classify(&Frame::new(vec![0xA4])),
            Event::Unknown {
                marker: Some(0xA4),
                tag: None,
                len: 1
            }
        );
        assert_eq!(
            classify(&Frame::new(Vec::new())),
            Event::Unknown {
                marker: None,
                tag: None,
                len: 0
            }
        );
    }

    #[test]
    fn short_odometry_still_decodes() {
        let event = classify(&Frame::new(vec![0xA4, TAG_ODOMETRY, 1, 4]));
        assert!(matches!(event, Event::Odometry(odo) if odo.left_ticks == 4));
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(Event::TargetReached).unwrap();
        assert_eq!(json["event"], "target_reached");

        let json = serde_json::to_value(Event::Odometry(Odometry {
            left_ticks: 3,
            right_ticks: -3,
            heading: 12.5,
        }))
        .unwrap();
        assert_eq!(json["event"], "odometry");
        assert_eq!(json["right_ticks"], -3);
        assert_eq!(Event::Ready.name(), "ready");
    }
}
