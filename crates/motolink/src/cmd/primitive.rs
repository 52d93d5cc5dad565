use clap::Subcommand;
use motolink_protocol::Command;

/// Motion primitives as typed on the command line.
///
/// Signed quantities pick the direction; magnitudes above 255 are clamped.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Drive straight ahead for DISTANCE.
    #[command(allow_negative_numbers = true)]
    Forward { speed: i32, distance: i32 },
    /// Drive straight back for DISTANCE.
    #[command(allow_negative_numbers = true)]
    Reverse { speed: i32, distance: i32 },
    /// Rotate in place by ANGLE degrees (-180..=180).
    #[command(allow_negative_numbers = true)]
    Rotate { speed: i32, angle: i32 },
    /// Drive an arc of ANGLE degrees with RADIUS.
    #[command(allow_negative_numbers = true)]
    Turn { speed: i32, angle: i32, radius: i32 },
    /// Set raw wheel speeds.
    #[command(allow_negative_numbers = true)]
    DriveRaw { left: i32, right: i32 },
    /// Stop both wheels.
    Stop {
        /// Brake instead of coasting.
        #[arg(long)]
        hard: bool,
    },
    /// Zero the heading reference.
    ResetOrientation,
    /// Drive DISTANCE while holding HEADING.
    #[command(allow_negative_numbers = true)]
    KeepHeading {
        speed: i32,
        heading: i32,
        distance: i32,
    },
}

impl From<Primitive> for Command {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Forward { speed, distance } => Command::forward(speed, distance),
            Primitive::Reverse { speed, distance } => Command::reverse(speed, distance),
            Primitive::Rotate { speed, angle } => Command::rotate(speed, angle),
            Primitive::Turn {
                speed,
                angle,
                radius,
            } => Command::turn(speed, angle, radius),
            Primitive::DriveRaw { left, right } => Command::drive_raw(left, right),
            Primitive::Stop { hard } => Command::stop(hard),
            Primitive::ResetOrientation => Command::reset_orientation(),
            Primitive::KeepHeading {
                speed,
                heading,
                distance,
            } => Command::keep_heading(speed, heading, distance),
        }
    }
}
