#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the accelerometer streaming pipeline.
//!
//! `Config` and its sections are deserialized from TOML and validated with
//! `Config::validate`. Every section except `[dispatch]` and `[stream]` has
//! defaults matching a stock ADXL345 on I2C bus 1.
use serde::Deserialize;
use std::path::Path;

/// Rates the ADXL345 BW_RATE register accepts in normal power mode.
pub const SUPPORTED_RATES_HZ: [f32; 10] = [
    6.25, 12.5, 25.0, 50.0, 100.0, 200.0, 400.0, 800.0, 1600.0, 3200.0,
];

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangeCfg {
    #[serde(rename = "2g")]
    G2,
    #[serde(rename = "4g")]
    G4,
    #[serde(rename = "8g")]
    G8,
    #[default]
    #[serde(rename = "16g")]
    G16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceCfg {
    /// I2C bus index (`/dev/i2c-N`)
    pub bus: u8,
    /// 7-bit slave address
    pub address: u16,
    /// Expected DEVID byte
    pub expected_id: u8,
    /// Full-resolution scale factor (mg per LSB)
    pub scale_mg_per_lsb: f32,
    pub range: RangeCfg,
    pub data_rate_hz: f32,
    /// Optional OFSX/OFSY/OFSZ trim
    pub offsets: Option<[i8; 3]>,
}

impl Default for DeviceCfg {
    fn default() -> Self {
        Self {
            bus: 1,
            address: 0x53,
            expected_id: 0xE5,
            scale_mg_per_lsb: 3.9,
            range: RangeCfg::G16,
            data_rate_hz: 400.0,
            offsets: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PipelineCfg {
    /// Window length (ms)
    pub tick_ms: u64,
    /// Windows per classification batch
    pub batch_size: usize,
    /// Pause between sensor reads (us); 0 reads as fast as the bus allows
    pub acquire_interval_us: u64,
    /// Full batches that may wait for the dispatch thread
    pub handoff_capacity: usize,
}

impl Default for PipelineCfg {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            batch_size: 11,
            acquire_interval_us: 2_500,
            handoff_capacity: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DispatchCfg {
    pub url: String,
    #[serde(default = "default_dispatch_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_dispatch_timeout_ms() -> u64 {
    2_000
}

#[derive(Debug, Deserialize)]
pub struct StreamCfg {
    pub url: String,
    #[serde(default = "default_connect_backoff_ms")]
    pub connect_backoff_ms: u64,
}

fn default_connect_backoff_ms() -> u64 {
    1_000
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceCfg,
    #[serde(default)]
    pub pipeline: PipelineCfg,
    pub dispatch: DispatchCfg,
    pub stream: StreamCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Device
        if self.device.address > 0x7F {
            eyre::bail!("device.address must be a 7-bit address (<= 0x7f)");
        }
        if !self.device.scale_mg_per_lsb.is_finite() || self.device.scale_mg_per_lsb <= 0.0 {
            eyre::bail!("device.scale_mg_per_lsb must be finite and > 0");
        }
        if !SUPPORTED_RATES_HZ.contains(&self.device.data_rate_hz) {
            eyre::bail!(
                "device.data_rate_hz must be one of {:?}, got {}",
                SUPPORTED_RATES_HZ,
                self.device.data_rate_hz
            );
        }

        // Pipeline
        if self.pipeline.tick_ms == 0 {
            eyre::bail!("pipeline.tick_ms must be >= 1");
        }
        if self.pipeline.batch_size == 0 {
            eyre::bail!("pipeline.batch_size must be >= 1");
        }
        if self.pipeline.handoff_capacity == 0 {
            eyre::bail!("pipeline.handoff_capacity must be >= 1");
        }
        if self.pipeline.acquire_interval_us >= self.pipeline.tick_ms.saturating_mul(1_000) {
            eyre::bail!("pipeline.acquire_interval_us must be shorter than one tick");
        }

        // Dispatch
        if !has_scheme(&self.dispatch.url, &["http://", "https://"]) {
            eyre::bail!("dispatch.url must start with http:// or https://");
        }
        if self.dispatch.timeout_ms == 0 {
            eyre::bail!("dispatch.timeout_ms must be >= 1");
        }

        // Stream
        if !has_scheme(&self.stream.url, &["ws://", "wss://"]) {
            eyre::bail!("stream.url must start with ws:// or wss://");
        }
        if self.stream.connect_backoff_ms == 0 {
            eyre::bail!("stream.connect_backoff_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

fn has_scheme(url: &str, schemes: &[&str]) -> bool {
    schemes
        .iter()
        .any(|s| url.len() > s.len() && url.starts_with(s))
}
