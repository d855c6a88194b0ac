use accel_config::{RangeCfg, load_file, load_toml};
use rstest::rstest;
use std::fs;

const MINIMAL: &str = r#"
[dispatch]
url = "http://127.0.0.1:9999/classify"

[stream]
url = "ws://192.168.1.6:8099/"
"#;

#[test]
fn minimal_config_uses_device_and_pipeline_defaults() {
    let cfg = load_toml(MINIMAL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");

    assert_eq!(cfg.device.bus, 1);
    assert_eq!(cfg.device.address, 0x53);
    assert_eq!(cfg.device.expected_id, 0xE5);
    assert_eq!(cfg.device.range, RangeCfg::G16);
    assert_eq!(cfg.pipeline.tick_ms, 50);
    assert_eq!(cfg.pipeline.batch_size, 11);
    assert_eq!(cfg.stream.connect_backoff_ms, 1_000);
    assert_eq!(cfg.dispatch.timeout_ms, 2_000);
}

#[test]
fn full_config_parses_hex_and_offsets() {
    let toml = r#"
[device]
bus = 0
address = 0x1d
expected_id = 0xe5
scale_mg_per_lsb = 4.0
range = "2g"
data_rate_hz = 12.5
offsets = [1, -1, 0]

[pipeline]
tick_ms = 20
batch_size = 4
acquire_interval_us = 0
handoff_capacity = 2

[dispatch]
url = "https://classifier.local/run"
timeout_ms = 500

[stream]
url = "wss://dash.local/feed"
connect_backoff_ms = 250

[logging]
file = "accel.log"
level = "debug"
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid");
    assert_eq!(cfg.device.address, 0x1D);
    assert_eq!(cfg.device.range, RangeCfg::G2);
    assert_eq!(cfg.device.offsets, Some([1, -1, 0]));
    assert_eq!(cfg.pipeline.handoff_capacity, 2);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[rstest]
#[case("[pipeline]\ntick_ms = 0\n", "pipeline.tick_ms")]
#[case("[pipeline]\nbatch_size = 0\n", "pipeline.batch_size")]
#[case("[pipeline]\nhandoff_capacity = 0\n", "pipeline.handoff_capacity")]
#[case("[pipeline]\ntick_ms = 1\nacquire_interval_us = 1000\n", "acquire_interval_us")]
#[case("[device]\ndata_rate_hz = 401.0\n", "device.data_rate_hz")]
#[case("[device]\nscale_mg_per_lsb = 0.0\n", "device.scale_mg_per_lsb")]
#[case("[device]\naddress = 0x80\n", "device.address")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
fn rejects_out_of_range_values(#[case] extra: &str, #[case] needle: &str) {
    let toml = format!("{extra}\n{MINIMAL}");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "error {err} should mention {needle}"
    );
}

#[rstest]
#[case("ftp://x/", "ws://x/", "dispatch.url")]
#[case("http://x/", "http://x/", "stream.url")]
#[case("http://x/", "ws://", "stream.url")]
fn rejects_wrong_url_schemes(#[case] dispatch: &str, #[case] stream: &str, #[case] needle: &str) {
    let toml = format!("[dispatch]\nurl = \"{dispatch}\"\n\n[stream]\nurl = \"{stream}\"\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(format!("{err}").contains(needle));
}

#[test]
fn missing_stream_section_is_a_parse_error() {
    let toml = "[dispatch]\nurl = \"http://x/\"\n";
    assert!(load_toml(toml).is_err());
}

#[test]
fn load_file_reads_from_disk_and_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("accel.toml");
    fs::write(&path, MINIMAL).expect("write");
    let cfg = load_file(&path).expect("load");
    assert_eq!(cfg.stream.url, "ws://192.168.1.6:8099/");

    let missing = dir.path().join("nope.toml");
    let err = load_file(&missing).expect_err("missing file");
    assert!(format!("{err}").contains("nope.toml"));
}
