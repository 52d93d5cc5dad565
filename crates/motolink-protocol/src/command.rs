use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

/// First byte of every outbound command.
pub const START_MARKER: u8 = 0xA3;

/// Command opcodes understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Opcode {
    Forward = 0x10,
    Reverse = 0x11,
    Rotate = 0x12,
    Turn = 0x13,
    DriveRaw = 0x14,
    Stop = 0x15,
    KeepHeading = 0x16,
    ResetOrientation = 0x20,
}

impl Opcode {
    /// Wire value.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parse a wire value.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x10 => Some(Self::Forward),
            0x11 => Some(Self::Reverse),
            0x12 => Some(Self::Rotate),
            0x13 => Some(Self::Turn),
            0x14 => Some(Self::DriveRaw),
            0x15 => Some(Self::Stop),
            0x16 => Some(Self::KeepHeading),
            0x20 => Some(Self::ResetOrientation),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
            Self::Rotate => "rotate",
            Self::Turn => "turn",
            Self::DriveRaw => "drive_raw",
            Self::Stop => "stop",
            Self::KeepHeading => "keep_heading",
            Self::ResetOrientation => "reset_orientation",
        }
    }
}

/// How the sign of a quantity maps onto its direction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// Zero or positive values send `1`, negative values send `0`.
    PositiveIsOne,
    /// Zero or positive values send `0`, negative values send `1`.
    PositiveIsZero,
}

impl SignConvention {
    /// Direction byte for `value`.
    pub fn direction_byte(self, value: i32) -> u8 {
        let positive = value >= 0;
        match (self, positive) {
            (Self::PositiveIsOne, true) | (Self::PositiveIsZero, false) => 1,
            (Self::PositiveIsOne, false) | (Self::PositiveIsZero, true) => 0,
        }
    }

    /// The opposite mapping.
    pub fn inverted(self) -> Self {
        match self {
            Self::PositiveIsOne => Self::PositiveIsZero,
            Self::PositiveIsZero => Self::PositiveIsOne,
        }
    }
}

/// Sign convention per opcode that carries a direction byte.
///
/// Firmware revisions disagree: rotate and turn have historically used the
/// inverse mapping of drive and keep-heading. Which one a given controller
/// expects has to be confirmed against its firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignConventions {
    pub rotate: SignConvention,
    pub turn: SignConvention,
    pub drive_raw: SignConvention,
    pub keep_heading: SignConvention,
}

impl Default for SignConventions {
    fn default() -> Self {
        Self {
            rotate: SignConvention::PositiveIsZero,
            turn: SignConvention::PositiveIsZero,
            drive_raw: SignConvention::PositiveIsOne,
            keep_heading: SignConvention::PositiveIsOne,
        }
    }
}

impl SignConventions {
    /// Convention for `opcode`, or `None` if it carries no direction byte.
    pub fn for_opcode(&self, opcode: Opcode) -> Option<SignConvention> {
        match opcode {
            Opcode::Rotate => Some(self.rotate),
            Opcode::Turn => Some(self.turn),
            Opcode::DriveRaw => Some(self.drive_raw),
            Opcode::KeepHeading => Some(self.keep_heading),
            Opcode::Forward
            | Opcode::Reverse
            | Opcode::Stop
            | Opcode::ResetOrientation => None,
        }
    }
}

/// How a command reports that it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// Done as soon as the bytes are written.
    Immediate,
    /// Done when the controller reports target reached.
    TargetReached,
    /// Done after a fixed settling delay; hard stops settle instantly.
    Settle { hard: bool },
}

/// A motion primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Forward { speed: i32, distance: i32 },
    Reverse { speed: i32, distance: i32 },
    Rotate { speed: i32, angle: i32 },
    Turn { speed: i32, angle: i32, radius: i32 },
    DriveRaw { left: i32, right: i32 },
    Stop { hard: bool },
    ResetOrientation,
    KeepHeading { speed: i32, heading: i32, distance: i32 },
}

impl Command {
    pub fn forward(speed: i32, distance: i32) -> Self {
        Self::Forward { speed, distance }
    }

    pub fn reverse(speed: i32, distance: i32) -> Self {
        Self::Reverse { speed, distance }
    }

    /// Rotate in place; `angle` is in degrees, `[-180, 180]`.
    pub fn rotate(speed: i32, angle: i32) -> Self {
        Self::Rotate { speed, angle }
    }

    pub fn turn(speed: i32, angle: i32, radius: i32) -> Self {
        Self::Turn {
            speed,
            angle,
            radius,
        }
    }

    pub fn drive_raw(left: i32, right: i32) -> Self {
        Self::DriveRaw { left, right }
    }

    pub fn stop(hard: bool) -> Self {
        Self::Stop { hard }
    }

    pub fn reset_orientation() -> Self {
        Self::ResetOrientation
    }

    pub fn keep_heading(speed: i32, heading: i32, distance: i32) -> Self {
        Self::KeepHeading {
            speed,
            heading,
            distance,
        }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Forward { .. } => Opcode::Forward,
            Self::Reverse { .. } => Opcode::Reverse,
            Self::Rotate { .. } => Opcode::Rotate,
            Self::Turn { .. } => Opcode::Turn,
            Self::DriveRaw { .. } => Opcode::DriveRaw,
            Self::Stop { .. } => Opcode::Stop,
            Self::ResetOrientation => Opcode::ResetOrientation,
            Self::KeepHeading { .. } => Opcode::KeepHeading,
        }
    }

    /// Whether this command waits for a target-reached notification.
    pub fn completion(&self) -> CompletionKind {
        match *self {
            Self::Forward { distance, .. }
            | Self::Reverse { distance, .. }
            | Self::KeepHeading { distance, .. } => target_if_nonzero(distance),
            Self::Rotate { angle, .. } | Self::Turn { angle, .. } => target_if_nonzero(angle),
            Self::Stop { hard } => CompletionKind::Settle { hard },
            Self::DriveRaw { .. } | Self::ResetOrientation => CompletionKind::Immediate,
        }
    }
}

fn target_if_nonzero(value: i32) -> CompletionKind {
    if magnitude(value) == 0 {
        CompletionKind::Immediate
    } else {
        CompletionKind::TargetReached
    }
}

/// Magnitude byte: `abs(value)` clamped to `[0, 255]`.
pub fn magnitude(value: i32) -> u8 {
    value.unsigned_abs().min(u32::from(u8::MAX)) as u8
}

/// Turns commands into unframed wire payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandEncoder {
    conventions: SignConventions,
}

impl CommandEncoder {
    pub fn new(conventions: SignConventions) -> Self {
        Self { conventions }
    }

    pub fn conventions(&self) -> &SignConventions {
        &self.conventions
    }

    /// Encode `[START_MARKER, opcode, args...]`.
    pub fn encode(&self, command: &Command) -> Bytes {
        let opcode = command.opcode();
        let mut buf = BytesMut::with_capacity(8);
        buf.put_u8(START_MARKER);
        buf.put_u8(opcode.as_byte());

        // Only consulted for opcodes that carry a direction byte.
        let convention = self
            .conventions
            .for_opcode(opcode)
            .unwrap_or(SignConvention::PositiveIsOne);
        let signed = |buf: &mut BytesMut, value: i32| {
            buf.put_u8(magnitude(value));
            buf.put_u8(convention.direction_byte(value));
        };

        match *command {
            Command::Forward { speed, distance } | Command::Reverse { speed, distance } => {
                buf.put_u8(magnitude(speed));
                buf.put_u8(magnitude(distance));
            }
            Command::Rotate { speed, angle } => {
                buf.put_u8(magnitude(speed));
                signed(&mut buf, angle);
            }
            Command::Turn {
                speed,
                angle,
                radius,
            } => {
                buf.put_u8(magnitude(speed));
                signed(&mut buf, angle);
                buf.put_u8(magnitude(radius));
            }
            Command::DriveRaw { left, right } => {
                signed(&mut buf, left);
                signed(&mut buf, right);
            }
            Command::Stop { hard } => {
                buf.put_u8(u8::from(hard));
            }
            Command::ResetOrientation => {}
            Command::KeepHeading {
                speed,
                heading,
                distance,
            } => {
                buf.put_u8(magnitude(speed));
                signed(&mut buf, heading);
                buf.put_u8(magnitude(distance));
            }
        }

        buf.freeze()
    }
}
