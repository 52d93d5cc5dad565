//! Odometry payload decoding.
//!
//! Payload layout (6 bytes):
//! ```text
//! ┌─────────┬───────────┬──────────┬────────────┬────────────┬────────────┐
//! │ leftDir │ leftDelta │ rightDir │ rightDelta │ headingMsb │ headingLsb │
//! └─────────┴───────────┴──────────┴────────────┴────────────┴────────────┘
//! ```
//! Values are passed through uninterpreted: a corrupted payload yields odd
//! numbers, never an error. Missing bytes read as zero.

use serde::Serialize;

/// Expected odometry payload length.
pub const ODOMETRY_PAYLOAD_LEN: usize = 6;

/// One odometry sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Odometry {
    /// Signed left wheel tick delta.
    pub left_ticks: i32,
    /// Signed right wheel tick delta.
    pub right_ticks: i32,
    /// Heading in degrees, two decimal places of precision.
    pub heading: f64,
}

/// Decode an odometry payload.
pub fn decode_odometry(payload: &[u8]) -> Odometry {
    let byte = |idx: usize| payload.get(idx).copied().unwrap_or(0);

    Odometry {
        left_ticks: signed_ticks(byte(0), byte(1)),
        right_ticks: signed_ticks(byte(2), byte(3)),
        heading: f64::from(parse_fixed_point(byte(4), byte(5))) / 100.0,
    }
}

/// `delta` scaled by the direction byte; a zero direction byte means reverse.
///
/// The direction byte is used as the multiplier itself, so a controller
/// sending `2` doubles the delta. Existing firmware relies on 0 and 1 only.
pub fn signed_ticks(direction: u8, delta: u8) -> i32 {
    let sign = if direction == 0 {
        -1
    } else {
        i32::from(direction)
    };
    i32::from(delta) * sign
}

/// Rebuild the 16-bit heading quantity from its two wire bytes.
///
/// Each byte is rendered as an 8-digit binary string, the two strings are
/// concatenated (`msb` first) and the result is parsed back in base 2.
///
/// Because both bytes are zero-padded to eight digits, the result equals
/// `u16::from_be_bytes([msb, lsb])` for every input. Decoders still go
/// through this helper so the heading rule lives in one place.
pub fn parse_fixed_point(msb: u8, lsb: u8) -> u16 {
    let digits = format!("{msb:08b}{lsb:08b}");
    u16::from_str_radix(&digits, 2).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_follow_direction_bytes() {
        let odo = decode_odometry(&[1, 10, 0, 5, 0, 0]);
        assert_eq!(odo.left_ticks, 10);
        assert_eq!(odo.right_ticks, -5);
    }

    #[test]
    fn zero_direction_means_reverse() {
        assert_eq!(signed_ticks(0, 0), 0);
        assert_eq!(signed_ticks(0, 255), -255);
        assert_eq!(signed_ticks(1, 255), 255);
    }

    #[test]
    fn direction_byte_is_a_multiplier() {
        assert_eq!(signed_ticks(2, 10), 20);
        assert_eq!(signed_ticks(255, 2), 510);
    }

    #[test]
    fn heading_reconstruction_is_pinned() {
        // 90.00 degrees -> 9000 = 0x2328
        assert_eq!(parse_fixed_point(0x23, 0x28), 9000);
        // Padding of the low byte matters: an unpadded concat would give 0b11.
        assert_eq!(parse_fixed_point(1, 1), 257);
        assert_eq!(parse_fixed_point(0, 1), 1);
        assert_eq!(parse_fixed_point(0xFF, 0xFF), u16::MAX);

        let odo = decode_odometry(&[1, 0, 1, 0, 0x23, 0x28]);
        assert!((odo.heading - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn heading_matches_big_endian_for_every_input() {
        for msb in [0u8, 1, 0x0F, 0x23, 0x80, 0xFF] {
            for lsb in 0..=u8::MAX {
                assert_eq!(
                    parse_fixed_point(msb, lsb),
                    u16::from_be_bytes([msb, lsb]),
                    "msb={msb} lsb={lsb}"
                );
            }
        }
    }

    #[test]
    fn short_payload_does_not_panic() {
        let odo = decode_odometry(&[1, 3]);
        assert_eq!(odo.left_ticks, 3);
        assert_eq!(odo.right_ticks, 0);
        assert_eq!(odo.heading, 0.0);

        let odo = decode_odometry(&[]);
        assert_eq!(odo.left_ticks, 0);
    }

    #[test]
    fn out_of_range_heading_passes_through() {
        let odo = decode_odometry(&[1, 0, 1, 0, 0xFF, 0xFF]);
        assert!((odo.heading - 655.35).abs() < 1e-9);
    }
}
