use motolink_driver::{Driver, DriverEvent};
use motolink_protocol::{Command, CommandEncoder};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::cmd::{link, parse_duration, parse_optional_duration, DriveArgs};
use crate::exit::{driver_error, CliError, CliResult, INTERRUPTED, SUCCESS};
use crate::output::{hex, millis, print_event, print_outcome, DriveOutcome, OutputFormat};

pub async fn run(args: DriveArgs, format: OutputFormat) -> CliResult<i32> {
    let mut config = args.link.driver_config()?;
    config.completion_timeout = parse_optional_duration(&args.completion_timeout)?;
    config.settle_delay = parse_duration(&args.settle)?;
    config.sign_conventions = args.conventions.sign_conventions();

    let driver = Driver::new(config);
    let mut events = driver.subscribe();
    link::connect(&driver, &args.link).await?;

    let command = Command::from(args.primitive);
    let payload = CommandEncoder::new(driver.config().sign_conventions).encode(&command);

    let started = Instant::now();
    let completion = driver
        .issue(command)
        .await
        .map_err(|err| driver_error("send failed", err))?;
    info!(command = command.opcode().name(), "command sent");

    let status = if completion.is_immediate() {
        "completed"
    } else if args.no_wait {
        "sent"
    } else {
        let wait = completion.wait();
        tokio::pin!(wait);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                result = &mut wait => {
                    result.map_err(|err| driver_error("command failed", err))?;
                    break;
                }
                _ = &mut ctrl_c => {
                    warn!("interrupted, sending hard stop");
                    interrupt(&driver).await;
                    return Err(CliError::new(INTERRUPTED, "interrupted"));
                }
                event = events.recv(), if args.events => {
                    if let Ok(event) = event {
                        if !matches!(event, DriverEvent::Ready) {
                            print_event(&event, format);
                        }
                    }
                }
            }
        }
        "completed"
    };

    driver.close();
    print_outcome(
        &DriveOutcome {
            command: &command,
            payload: hex(&payload),
            status,
            elapsed_ms: millis(started.elapsed()),
        },
        format,
    );

    Ok(SUCCESS)
}

async fn interrupt(driver: &Driver) {
    driver.cancel_pending();
    if let Err(err) = driver.stop(true).await {
        warn!(%err, "hard stop failed");
    }
    driver.close();
}
