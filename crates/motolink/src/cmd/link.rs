use motolink_driver::Driver;
use motolink_transport::SerialDevice;
use tracing::info;

use crate::cmd::LinkArgs;
use crate::exit::{driver_error, transport_error, CliResult};

/// Open the link named by `args` and complete the ready handshake.
pub async fn connect(driver: &Driver, args: &LinkArgs) -> CliResult<()> {
    if args.unix {
        open_unix(driver, args).await?;
    } else {
        let device = SerialDevice::open(&args.device, args.baud)
            .map_err(|err| transport_error("open failed", err))?;
        driver
            .init(device)
            .await
            .map_err(|err| driver_error("handshake failed", err))?;
    }

    info!(device = %args.device.display(), "connected");
    Ok(())
}

#[cfg(unix)]
async fn open_unix(driver: &Driver, args: &LinkArgs) -> CliResult<()> {
    let stream = motolink_transport::connect_unix(&args.device)
        .await
        .map_err(|err| transport_error("connect failed", err))?;
    driver
        .init(stream)
        .await
        .map_err(|err| driver_error("handshake failed", err))
}

#[cfg(not(unix))]
async fn open_unix(_driver: &Driver, _args: &LinkArgs) -> CliResult<()> {
    Err(crate::exit::CliError::new(
        crate::exit::USAGE,
        "--unix is only supported on Unix platforms",
    ))
}
