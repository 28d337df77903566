#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn kdcprims(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kdcprims"))
        .env_remove("KDCPRIMS_PORT")
        .env_remove("KDCPRIMS_ADDR")
        .env_remove("KDCPRIMS_STAGE")
        .env_remove("KDCPRIMS_MOTOR")
        .arg("--log-level")
        .arg("off")
        .args(args)
        .output()
        .expect("kdcprims should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn convert_position_to_counts() {
    let output = kdcprims(&["--format", "json", "convert", "10"]);
    assert_eq!(output.status.code(), Some(0));

    let json = stdout_json(&output);
    assert_eq!(json["counts"], 345_550);
    assert_eq!(json["stage"], "MTS25-Z8");
    assert_eq!(json["unit"], "mm");
}

#[test]
fn convert_counts_back_to_degrees() {
    let output = kdcprims(&[
        "--format",
        "raw",
        "--stage",
        "PRM1-Z8",
        "convert",
        "--from-counts",
        "1919.64",
    ]);
    assert_eq!(output.status.code(), Some(60));

    let output = kdcprims(&[
        "--format",
        "json",
        "--stage",
        "PRM1-Z8",
        "convert",
        "--from-counts",
        "1920",
    ]);
    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["unit"], "deg");
    assert!((json["physical"].as_f64().unwrap() - 1920.0 / 1919.641_857_862_339_1).abs() < 1e-9);
}

#[test]
fn convert_raw_prints_single_value() {
    let output = kdcprims(&["--format", "raw", "convert", "-5"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "-172775");
}

#[test]
fn unknown_stage_is_usage_error() {
    let output = kdcprims(&["--stage", "NOPE", "convert", "1"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("NOPE"), "stderr: {stderr}");
}

#[test]
fn device_commands_need_a_device() {
    let output = kdcprims(&["status"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no device selected"), "stderr: {stderr}");
}

#[test]
fn version_reports_features() {
    let output = kdcprims(&["version", "--extended"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: kdcprims"));
    assert!(stdout.contains("cli=true"));
    assert!(stdout.contains("KVS30"));
}
