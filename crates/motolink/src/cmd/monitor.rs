use motolink_driver::{Driver, DriverEvent};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::cmd::{link, MonitorArgs};
use crate::exit::{CliResult, FAILURE, SUCCESS};
use crate::output::{print_event, OutputFormat};

pub fn wanted(filter: &Option<Vec<String>>, event: &DriverEvent) -> bool {
    match filter {
        Some(names) => names.iter().any(|name| name == event.name()),
        None => true,
    }
}

pub async fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let driver = Driver::new(args.link.driver_config()?);
    let mut events = driver.subscribe();
    link::connect(&driver, &args.link).await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut printed = 0usize;
    loop {
        let event = tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                driver.close();
                return Ok(SUCCESS);
            }
            event = events.recv() => event,
        };

        let event = match event {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "event output fell behind");
                continue;
            }
            Err(RecvError::Closed) => return Ok(SUCCESS),
        };

        if wanted(&args.events, &event) {
            print_event(&event, format);
            printed = printed.saturating_add(1);
        }

        match event {
            DriverEvent::Disconnect => return Ok(FAILURE),
            DriverEvent::Close => return Ok(SUCCESS),
            _ => {}
        }

        if args.count.is_some_and(|count| printed >= count) {
            driver.close();
            return Ok(SUCCESS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_event_names() {
        let filter = Some(vec!["odometry".to_string(), "close".to_string()]);
        assert!(wanted(&filter, &DriverEvent::Close));
        assert!(!wanted(&filter, &DriverEvent::TargetReached));
        assert!(wanted(&None, &DriverEvent::TargetReached));
    }
}
