use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use motolink_driver::DriverConfig;
use motolink_protocol::SignConventions;

use crate::exit::{CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod drive;
pub mod encode;
pub mod link;
pub mod monitor;
pub mod primitive;
pub mod version;

pub use primitive::Primitive;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the wire bytes for a motion primitive (offline).
    Encode(EncodeArgs),
    /// Parse a captured byte stream into events (offline).
    Decode(DecodeArgs),
    /// Connect, wait for ready and print events.
    Monitor(MonitorArgs),
    /// Connect, issue one motion primitive and wait for it to complete.
    Drive(DriveArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Monitor(args) => block_on(monitor::run(args, format)),
        Command::Drive(args) => block_on(drive::run(args, format)),
        Command::Version(args) => version::run(args),
    }
}

fn block_on<F>(future: F) -> CliResult<i32>
where
    F: std::future::Future<Output = CliResult<i32>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("runtime setup failed: {err}")))?;
    runtime.block_on(future)
}

/// Direction-byte overrides for controllers wired the other way round.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ConventionArgs {
    /// Flip the direction byte of rotate.
    #[arg(long)]
    pub invert_rotate: bool,
    /// Flip the direction byte of turn.
    #[arg(long)]
    pub invert_turn: bool,
    /// Flip both direction bytes of drive-raw.
    #[arg(long)]
    pub invert_drive_raw: bool,
    /// Flip the direction byte of keep-heading.
    #[arg(long)]
    pub invert_keep_heading: bool,
}

impl ConventionArgs {
    pub fn sign_conventions(&self) -> SignConventions {
        let mut conventions = SignConventions::default();
        if self.invert_rotate {
            conventions.rotate = conventions.rotate.inverted();
        }
        if self.invert_turn {
            conventions.turn = conventions.turn.inverted();
        }
        if self.invert_drive_raw {
            conventions.drive_raw = conventions.drive_raw.inverted();
        }
        if self.invert_keep_heading {
            conventions.keep_heading = conventions.keep_heading.inverted();
        }
        conventions
    }
}

/// Where the controller lives and how long to wait for it.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial device node (or socket path with --unix).
    #[arg(env = "MOTOLINK_DEVICE")]
    pub device: PathBuf,
    /// Treat DEVICE as a Unix socket path (firmware simulators).
    #[arg(long)]
    pub unix: bool,
    /// Serial line rate; ignored with --unix.
    #[arg(long, default_value_t = motolink_transport::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// How long to wait for the controller's ready frame (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub handshake_timeout: String,
    /// Largest encoded inbound frame before the parser resynchronizes.
    #[arg(long, default_value_t = motolink_frame::DEFAULT_MAX_FRAME_LEN)]
    pub max_frame_len: usize,
}

impl LinkArgs {
    /// Driver configuration for this link.
    pub fn driver_config(&self) -> CliResult<DriverConfig> {
        let mut config = DriverConfig {
            handshake_timeout: parse_duration(&self.handshake_timeout)?,
            ..DriverConfig::default()
        };
        config.parser.max_frame_len = self.max_frame_len;
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub conventions: ConventionArgs,
    #[command(subcommand)]
    pub primitive: Primitive,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Captured bytes in hex; whitespace, ':' and ',' separators are ignored.
    #[arg(required = true, num_args = 1..)]
    pub hex: Vec<String>,
    /// Largest encoded frame before the parser resynchronizes.
    #[arg(long, default_value_t = motolink_frame::DEFAULT_MAX_FRAME_LEN)]
    pub max_frame_len: usize,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Exit after printing N events (ready included).
    #[arg(long)]
    pub count: Option<usize>,
    /// Only print these events (comma-separated, e.g. odometry,target_reached).
    #[arg(long, value_delimiter = ',')]
    pub events: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct DriveArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    #[command(flatten)]
    pub conventions: ConventionArgs,
    /// Upper bound on waiting for target reached (e.g. 30s); "none" waits forever.
    #[arg(long, default_value = "30s")]
    pub completion_timeout: String,
    /// Settling delay after a soft stop (e.g. 500ms).
    #[arg(long, default_value = "500ms")]
    pub settle: String,
    /// Return as soon as the command is written.
    #[arg(long)]
    pub no_wait: bool,
    /// Print telemetry events while waiting.
    #[arg(long)]
    pub events: bool,
    #[command(subcommand)]
    pub primitive: Primitive,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

/// Like [`parse_duration`], with `none` meaning no limit.
pub fn parse_optional_duration(input: &str) -> CliResult<Option<Duration>> {
    if input.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let duration = parse_duration(input)?;
    if duration.is_zero() {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }
    Ok(Some(duration))
}
