use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Endpoints are never contacted by self-check.
const VALID: &str = r#"
[device]
bus = 1
address = 0x53
data_rate_hz = 100.0

[pipeline]
tick_ms = 50
batch_size = 11

[dispatch]
url = "http://127.0.0.1:9/classify"

[stream]
url = "ws://127.0.0.1:9/"
"#;

fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("accel.toml");
    fs::write(&path, body).unwrap();
    path
}

fn accel(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("accel").unwrap();
    cmd.arg("--config").arg(cfg).env_remove("ACCEL_SIM_DEVICE_ID");
    cmd
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("accel")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("self-check"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn self_check_reads_a_simulated_sample() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    accel(&cfg)
        .args(["self-check", "--simulate"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok: x="))
        .stdout(predicate::str::contains("(simulated)"));
}

#[test]
fn self_check_json_output_is_an_object() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    let out = accel(&cfg)
        .args(["--json", "--log-level", "error", "self-check", "--simulate"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("stdout is JSON");
    assert_eq!(v["ok"], true);
    assert_eq!(v["simulated"], true);
    assert!(v["y_mg"].as_f64().unwrap() > 0.0);
}

#[rstest]
#[case("0x00")]
#[case("0xE6")]
#[case("255")]
fn wrong_device_id_exits_with_three(#[case] id: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    accel(&cfg)
        .env("ACCEL_SIM_DEVICE_ID", id)
        .args(["self-check", "--simulate"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not an ADXL345"));
}

const ENDPOINTS: &str = r#"
[dispatch]
url = "http://127.0.0.1:9/classify"

[stream]
url = "ws://127.0.0.1:9/"
"#;

#[rstest]
#[case("[pipeline]\ntick_ms = 0\n", "tick_ms")]
#[case("[device]\ndata_rate_hz = 123.0\n", "data_rate_hz")]
#[case("[pipeline]\nhandoff_capacity = 0\n", "handoff_capacity")]
fn invalid_config_exits_with_four(#[case] section: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, &format!("{section}{ENDPOINTS}"));
    accel(&cfg)
        .args(["self-check", "--simulate"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains(needle));
}

#[test]
fn wrong_stream_scheme_exits_with_four() {
    let dir = tempdir().unwrap();
    let body = "[dispatch]\nurl = \"http://x/\"\n\n[stream]\nurl = \"http://x/\"\n";
    let cfg = write_config(&dir, body);
    accel(&cfg)
        .args(["self-check", "--simulate"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("stream.url"));
}

#[test]
fn missing_config_file_exits_with_four() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("nope.toml");
    accel(&cfg)
        .args(["self-check", "--simulate"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    let out = accel(&cfg)
        .env("ACCEL_SIM_DEVICE_ID", "0x00")
        .args(["--json", "self-check", "--simulate"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&out.stderr);
    let line = stderr
        .lines()
        .rev()
        .find(|l| l.contains("\"reason\""))
        .expect("JSON error line");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "DeviceMismatch");
}

#[test]
fn subcommand_is_required() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    accel(&cfg).assert().code(2);
}
