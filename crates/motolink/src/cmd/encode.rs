use motolink_frame::encode;
use motolink_protocol::{Command, CommandEncoder};

use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let encoder = CommandEncoder::new(args.conventions.sign_conventions());
    let command = Command::from(args.primitive);

    let payload = encoder.encode(&command);
    let wire = encode(&payload);
    print_encoded(&command, &payload, &wire, format);

    Ok(SUCCESS)
}
