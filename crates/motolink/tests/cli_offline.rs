#![cfg(feature = "cli")]

use std::process::Command;

fn motolink(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_motolink"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .output()
        .expect("motolink should run")
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).expect("stdout should be a single json document")
}

#[test]
fn encode_forward_prints_payload_and_wire() {
    let output = motolink(&["encode", "forward", "20", "100"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["command"]["command"], "forward");
    assert_eq!(json["opcode"], 0x10);
    assert_eq!(json["payload"], "a3 10 14 64");
    assert_eq!(json["wire"], "05 a3 10 14 64 00");
}

#[test]
fn encode_rotate_uses_direction_byte() {
    let output = motolink(&["encode", "rotate", "20", "-90"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["payload"], "a3 12 14 5a 01");

    let output = motolink(&["encode", "--invert-rotate", "rotate", "20", "-90"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["payload"], "a3 12 14 5a 00");
}

#[test]
fn encode_stuffs_zero_arguments() {
    let output = motolink(&["encode", "stop"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["payload"], "a3 15 00");
    assert_eq!(json["wire"], "03 a3 15 01 00");
}

#[test]
fn decode_reports_events_and_stats() {
    // ready, garbage frame, odometry (left +10, right -5, heading 90.00).
    let output = motolink(&[
        "decode",
        "03a40100",
        "09 01 00",
        "05 a4 02 01 0a 04 05 23 28 00",
    ]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    let events = json["events"].as_array().expect("events array");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], "ready");
    assert_eq!(events[1]["event"], "odometry");
    assert_eq!(events[1]["left_ticks"], 10);
    assert_eq!(events[1]["right_ticks"], -5);
    assert_eq!(events[1]["heading"], 90.0);
    assert_eq!(json["stats"]["frames"], 2);
    assert_eq!(json["stats"]["malformed"], 1);
    assert_eq!(json["pending_bytes"], 0);
}

#[test]
fn decode_keeps_partial_frame_pending() {
    let output = motolink(&["decode", "03 a4 01 00 03 a4"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["events"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["pending_bytes"], 2);
}

#[test]
fn decode_rejects_bad_hex_with_usage_code() {
    let output = motolink(&["decode", "0g"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_motolink"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("motolink {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn missing_device_is_a_transport_error() {
    let output = motolink(&["monitor", "/dev/motolink-does-not-exist"]);
    assert_eq!(output.status.code(), Some(3));
}
