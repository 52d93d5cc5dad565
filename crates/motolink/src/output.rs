use std::io::IsTerminal;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use motolink_driver::DriverEvent;
use motolink_frame::ParserStats;
use motolink_protocol::{Command, Event, Odometry};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Something printable as one event line.
pub trait EventRow: Serialize {
    fn name(&self) -> &'static str;
    fn detail(&self) -> String;
}

impl EventRow for DriverEvent {
    fn name(&self) -> &'static str {
        DriverEvent::name(self)
    }

    fn detail(&self) -> String {
        match self {
            DriverEvent::Odometry(odometry) => odometry_detail(odometry),
            DriverEvent::Error { message } => message.clone(),
            _ => String::new(),
        }
    }
}

impl EventRow for Event {
    fn name(&self) -> &'static str {
        Event::name(self)
    }

    fn detail(&self) -> String {
        match self {
            Event::Odometry(odometry) => odometry_detail(odometry),
            Event::Unknown { marker, tag, len } => format!(
                "marker={} tag={} len={len}",
                opt_byte(*marker),
                opt_byte(*tag)
            ),
            _ => String::new(),
        }
    }
}

pub fn print_event<E: EventRow>(event: &E, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", json_line(event, Some(now_unix_millis()))),
        OutputFormat::Table => {
            let mut table = new_table(vec!["EVENT", "DETAIL"]);
            table.add_row(vec![event.name().to_string(), event.detail()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", pretty_line(event)),
    }
}

#[derive(Serialize)]
struct StatsOutput {
    frames: u64,
    malformed: u64,
    discarded_bytes: u64,
}

impl From<ParserStats> for StatsOutput {
    fn from(stats: ParserStats) -> Self {
        Self {
            frames: stats.frames,
            malformed: stats.malformed,
            discarded_bytes: stats.discarded_bytes,
        }
    }
}

#[derive(Serialize)]
struct DecodeOutput<'a> {
    events: Vec<Value>,
    stats: StatsOutput,
    pending_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
}

/// Print everything decoded from a captured byte stream.
pub fn print_decoded(events: &[Event], stats: ParserStats, pending_bytes: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = DecodeOutput {
                events: events.iter().map(|e| to_value(e, None)).collect(),
                stats: stats.into(),
                pending_bytes,
                state: (pending_bytes > 0).then_some("accumulating_frame"),
            };
            println!("{}", to_json(&out));
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["#", "EVENT", "DETAIL"]);
            for (idx, event) in events.iter().enumerate() {
                table.add_row(vec![idx.to_string(), event.name().to_string(), event.detail()]);
            }
            println!("{table}");
            println!(
                "frames={} malformed={} discarded_bytes={} pending_bytes={pending_bytes}",
                stats.frames, stats.malformed, stats.discarded_bytes
            );
        }
        OutputFormat::Pretty => {
            for event in events {
                println!("{}", pretty_line(event));
            }
            println!(
                "-- {} frames, {} malformed, {} bytes discarded, {pending_bytes} bytes pending",
                stats.frames, stats.malformed, stats.discarded_bytes
            );
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    command: &'a Command,
    opcode: u8,
    payload: String,
    wire: String,
}

/// Print a command's payload and its framed wire bytes.
pub fn print_encoded(command: &Command, payload: &[u8], wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                command,
                opcode: command.opcode().as_byte(),
                payload: hex(payload),
                wire: hex(wire),
            };
            println!("{}", to_json(&out));
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["COMMAND", "PAYLOAD", "WIRE"]);
            table.add_row(vec![
                command.opcode().name().to_string(),
                hex(payload),
                hex(wire),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} payload=[{}] wire=[{}]",
                command.opcode().name(),
                hex(payload),
                hex(wire)
            );
        }
    }
}

/// How a driven command finished.
#[derive(Serialize)]
pub struct DriveOutcome<'a> {
    pub command: &'a Command,
    pub payload: String,
    pub status: &'static str,
    pub elapsed_ms: f64,
}

pub fn print_outcome(outcome: &DriveOutcome<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(outcome)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["COMMAND", "PAYLOAD", "STATUS", "ELAPSED"]);
            table.add_row(vec![
                outcome.command.opcode().name().to_string(),
                outcome.payload.clone(),
                outcome.status.to_string(),
                format!("{:.1} ms", outcome.elapsed_ms),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} [{}] {} in {:.1} ms",
                outcome.command.opcode().name(),
                outcome.payload,
                outcome.status,
                outcome.elapsed_ms
            );
        }
    }
}

/// Lowercase hex, space separated.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 10.0).round() / 10.0
}

fn odometry_detail(odometry: &Odometry) -> String {
    format!(
        "left={} right={} heading={:.2}",
        odometry.left_ticks, odometry.right_ticks, odometry.heading
    )
}

fn opt_byte(byte: Option<u8>) -> String {
    byte.map(|b| format!("0x{b:02x}"))
        .unwrap_or_else(|| "-".to_string())
}

fn pretty_line<E: EventRow>(event: &E) -> String {
    let detail = event.detail();
    if detail.is_empty() {
        event.name().to_string()
    } else {
        format!("{} {detail}", event.name())
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn to_value<E: Serialize>(event: &E, timestamp_ms: Option<u128>) -> Value {
    let mut value = serde_json::to_value(event).unwrap_or(Value::Null);
    if let (Value::Object(map), Some(ts)) = (&mut value, timestamp_ms) {
        map.insert("timestamp_ms".to_string(), Value::from(ts as u64));
    }
    value
}

fn json_line<E: Serialize>(event: &E, timestamp_ms: Option<u128>) -> String {
    to_value(event, timestamp_ms).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
