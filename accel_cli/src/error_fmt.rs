//! Human-readable error descriptions, exit codes and structured JSON errors.

use accel_core::error::{BuildError, PipelineError};
use accel_hardware::error::HwError;
use std::fmt;
use std::path::PathBuf;

/// Context attached to every config load/validation failure.
#[derive(Debug)]
pub struct ConfigError(pub PathBuf);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration in {}", self.0.display())
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(HwError::DeviceMismatch {
        bus,
        address,
        expected,
        found,
    }) = err.downcast_ref::<HwError>()
    {
        return format!(
            "What happened: The device at {address:#04x} on I2C bus {bus} is not an ADXL345 (device id {found:#04x}, expected {expected:#04x}).\nLikely causes: Wrong [device] address, another chip on the bus, or SDO strapped differently.\nHow to fix: Run `i2cdetect -y {bus}` and set device.address (0x53 or 0x1d) in the config."
        );
    }
    if let Some(HwError::I2c(msg)) = err.downcast_ref::<HwError>() {
        return format!(
            "What happened: The I2C bus could not be opened ({msg}).\nLikely causes: I2C disabled, wrong device.bus, or missing permissions on /dev/i2c-*.\nHow to fix: Enable I2C, check device.bus, and add the user to the i2c group."
        );
    }

    if let Some(cfg) = err.downcast_ref::<ConfigError>() {
        return format!(
            "What happened: Invalid configuration ({}).\nLikely causes: Missing [dispatch]/[stream] sections or out-of-range values in {}.\nHow to fix: Edit the TOML config, then rerun. See etc/accel_config.toml for a sample.",
            err.root_cause(),
            cfg.0.display()
        );
    }
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid pipeline settings ({be}).\nLikely causes: Zero batch size or hand-off capacity.\nHow to fix: Adjust the [pipeline] section and rerun."
        );
    }
    if let Some(PipelineError::Stopped) = err.downcast_ref::<PipelineError>() {
        return "What happened: Interrupted before the stream connection was established.\nLikely causes: Ctrl-C while the WebSocket endpoint was unreachable.\nHow to fix: Check stream.url and that the receiver is listening.".to_string();
    }

    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: device mismatch 3, configuration 4, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if matches!(
        err.downcast_ref::<HwError>(),
        Some(HwError::DeviceMismatch { .. })
    ) {
        return 3;
    }
    if err.downcast_ref::<ConfigError>().is_some() || err.downcast_ref::<BuildError>().is_some() {
        return 4;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        3 => "DeviceMismatch",
        4 => "Config",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    fn mismatch() -> eyre::Report {
        eyre::Report::new(HwError::DeviceMismatch {
            bus: 1,
            address: 0x53,
            expected: 0xE5,
            found: 0x00,
        })
    }

    #[test]
    fn device_mismatch_exits_with_three() {
        let err = mismatch();
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("0x00"));
    }

    #[test]
    fn config_context_exits_with_four() {
        let err: eyre::Result<()> = Err(eyre::eyre!("pipeline.tick_ms must be >= 1"));
        let err = err.wrap_err(ConfigError("cfg.toml".into())).unwrap_err();
        assert_eq!(exit_code_for_error(&err), 4);
        let text = humanize(&err);
        assert!(text.contains("tick_ms"), "{text}");
        assert!(text.contains("cfg.toml"), "{text}");
    }

    #[test]
    fn json_error_carries_reason_and_code() {
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&mismatch())).unwrap();
        assert_eq!(v["reason"], "DeviceMismatch");
        assert_eq!(v["exit_code"], 3);
    }

    #[test]
    fn unknown_errors_fall_back_to_one() {
        assert_eq!(exit_code_for_error(&eyre::eyre!("boom")), 1);
    }
}
