use clap::{Args, ValueEnum};
use tracing::level_filters::LevelFilter;

/// Log line encoding on stderr.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::OFF,
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];

/// Diagnostics flags shared by every subcommand.
///
/// Stdout carries command output only; all diagnostics go to stderr.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "MOTOLINK_LOG_FORMAT",
        global = true
    )]
    pub log_format: LogFormat,

    /// Minimum log level: off, error, warn, info, debug or trace.
    ///
    /// `debug` shows every frame sent and received; `trace` adds parser resyncs.
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "MOTOLINK_LOG_LEVEL",
        global = true
    )]
    pub log_level: LevelFilter,

    /// Raise the log level one step per flag (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl LogArgs {
    /// Effective level after applying `-v`.
    pub fn level(&self) -> LevelFilter {
        let base = LEVELS
            .iter()
            .position(|level| *level == self.log_level)
            .unwrap_or(0);
        LEVELS[(base + usize::from(self.verbose)).min(LEVELS.len() - 1)]
    }

    /// Install the stderr subscriber. Crate targets are only shown at debug
    /// and above, where frames from several layers interleave.
    pub fn install(&self) {
        let level = self.level();
        let builder = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(level)
            .with_ansi(false)
            .with_target(level >= LevelFilter::DEBUG);

        // A subscriber may already be installed (tests); keep it.
        let _ = match self.log_format {
            LogFormat::Text => builder.try_init(),
            LogFormat::Json => builder
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .try_init(),
        };
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        log: LogArgs,
    }

    fn parse(args: &[&str]) -> LogArgs {
        let argv = std::iter::once("motolink").chain(args.iter().copied());
        Harness::try_parse_from(argv).expect("log flags should parse").log
    }

    #[test]
    fn verbose_raises_the_level() {
        assert_eq!(parse(&[]).level(), LevelFilter::INFO);
        assert_eq!(parse(&["-v"]).level(), LevelFilter::DEBUG);
        assert_eq!(parse(&["-vvv"]).level(), LevelFilter::TRACE);
        assert_eq!(parse(&["--log-level", "off", "-v"]).level(), LevelFilter::ERROR);
    }

    #[test]
    fn json_format_parses() {
        let log = parse(&["--log-format", "json", "--log-level", "warn"]);
        assert_eq!(log.log_format, LogFormat::Json);
        assert_eq!(log.level(), LevelFilter::WARN);
    }
}
