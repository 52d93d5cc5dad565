use motolink_frame::{DEFAULT_MAX_FRAME_LEN, DEFAULT_MAX_PAYLOAD};
use motolink_protocol::START_MARKER;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("motolink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: motolink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("MOTOLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("MOTOLINK_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("framing: cobs, delimiter 0x00");
    println!("start_marker: 0x{START_MARKER:02x}");
    println!("max_payload: {DEFAULT_MAX_PAYLOAD}");
    println!("max_frame_len: {DEFAULT_MAX_FRAME_LEN}");

    Ok(SUCCESS)
}
