use motolink_frame::{ParserConfig, StreamParser};
use motolink_protocol::{classify, Event};

use crate::cmd::DecodeArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_decoded, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex.join(" "))?;

    let mut parser = StreamParser::with_config(ParserConfig {
        max_frame_len: args.max_frame_len,
    });
    let events: Vec<Event> = parser.feed(&bytes).iter().map(classify).collect();

    print_decoded(&events, parser.stats(), parser.buffered(), format);
    Ok(SUCCESS)
}

/// Parse hex digits, skipping whitespace and `:`/`,` separators and an
/// optional `0x` prefix per group.
fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let mut digits = Vec::with_capacity(input.len());
    for group in input.split(|c: char| c.is_whitespace() || c == ':' || c == ',') {
        let group = group
            .strip_prefix("0x")
            .or_else(|| group.strip_prefix("0X"))
            .unwrap_or(group);
        for c in group.chars() {
            let digit = c
                .to_digit(16)
                .ok_or_else(|| CliError::new(USAGE, format!("invalid hex digit: {c:?}")))?;
            digits.push(digit as u8);
        }
    }

    if digits.len() % 2 != 0 {
        return Err(CliError::new(USAGE, "hex input has an odd number of digits"));
    }

    Ok(digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_capture_layouts() {
        assert_eq!(parse_hex("03a40100").unwrap(), vec![0x03, 0xA4, 0x01, 0x00]);
        assert_eq!(
            parse_hex("03 A4 01 00").unwrap(),
            vec![0x03, 0xA4, 0x01, 0x00]
        );
        assert_eq!(parse_hex("03:a4:01:00").unwrap(), vec![0x03, 0xA4, 0x01, 0x00]);
        assert_eq!(parse_hex("0x03,0xa4").unwrap(), vec![0x03, 0xA4]);
    }

    #[test]
    fn rejects_bad_digits_and_odd_length() {
        assert_eq!(parse_hex("zz").unwrap_err().code, USAGE);
        assert_eq!(parse_hex("abc").unwrap_err().code, USAGE);
    }
}
