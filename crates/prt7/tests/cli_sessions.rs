#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "prt7cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn prt7(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_prt7"))
        .args(["--log-level", "error"])
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("prt7 should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("stdin should accept input");
    child.wait_with_output().expect("prt7 should finish")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn json_records(output: &Output) -> Vec<serde_json::Value> {
    stdout_of(output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be json"))
        .collect()
}

#[test]
fn simulate_reveals_demo_message() {
    let output = prt7(&["--format", "raw", "simulate"], "");
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "HOLC YORLD\n");
}

#[test]
fn simulate_json_traces_every_frame() {
    let output = prt7(&["--format", "json", "simulate"], "");
    assert!(output.status.success());

    let records = json_records(&output);
    assert_eq!(records.len(), 13);
    assert_eq!(records[3]["frame"], "M,2");
    assert_eq!(records[3]["event"]["kind"], "rotated");
    assert_eq!(records[3]["event"]["head"], "C");
    assert_eq!(records[4]["event"]["decoded"], "C");
    assert_eq!(records[12]["record"], "message");
    assert_eq!(records[12]["message"], "HOLC YORLD");
    assert_eq!(records[12]["frames_applied"], 12);
}

#[test]
fn manual_stops_at_quit_and_reports_bad_lines() {
    let output = prt7(
        &["--format", "json", "manual"],
        "L,H\nhello\n\nM,1\nL,H\nquit\nL,Z\n",
    );
    assert!(output.status.success());

    let records = json_records(&output);
    let kinds: Vec<&str> = records
        .iter()
        .map(|record| record["record"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(kinds, ["frame", "rejected", "frame", "frame", "message"]);
    assert_eq!(records[1]["line"], "hello");
    assert_eq!(records[4]["message"], "HI");
}

#[test]
fn manual_ends_at_end_of_input() {
    let output = prt7(&["--format", "raw", "manual"], "L,O\nL,K");
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "OK\n");
}

#[test]
fn decode_drops_noise_from_capture_file() {
    let dir = unique_temp_dir("decode");
    let capture = dir.join("capture.log");
    std::fs::write(
        &capture,
        "boot: emitter ready\r\nTX: L,H\r\n[M, 1]\r\nnoise\r\nL,H\r\n",
    )
    .expect("capture should be writable");

    let output = prt7(
        &["--format", "raw", "decode", capture.to_str().expect("utf-8 path")],
        "",
    );
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "HI\n");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn strict_decode_fails_on_rejected_lines() {
    let output = prt7(&["--format", "json", "decode", "--strict"], "L,A\nnoise\n");
    assert_eq!(output.status.code(), Some(60));

    let records = json_records(&output);
    assert_eq!(records[1]["record"], "rejected");
    assert_eq!(records[2]["message"], "A");
}

#[test]
fn strict_decode_of_clean_stdin_succeeds() {
    let output = prt7(&["--format", "raw", "decode", "--strict", "-"], "L,A\n\nM,-1\nL,A\n");
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "AZ\n");
}

#[test]
fn missing_capture_file_fails() {
    let output = prt7(&["decode", "/nonexistent/prt7-capture.log"], "");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: cannot open"));
}

#[test]
fn menu_runs_simulation_then_exits() {
    let output = prt7(&["--format", "raw", "menu"], "7\nn\n1\nn\n");
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Invalid option."));
    assert!(stdout.contains("HOLC YORLD\n"));
    assert!(stdout.ends_with("Program finished.\n"));
}

#[test]
fn menu_manual_shares_stdin_with_the_menu() {
    let output = prt7(&["--format", "raw", "menu"], "2\nL,G\nquit\ny\n4\n");
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("G\n"));
    assert!(stdout.contains("Closing the decoder..."));
}

#[test]
fn usage_errors_exit_with_clap_code() {
    let output = prt7(&["simulate", "--delay", "0s"], "");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = prt7(&["version"], "");
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        format!("prt7 {}\n", env!("CARGO_PKG_VERSION"))
    );
}
