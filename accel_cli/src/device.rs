//! Sensor construction: TOML device section -> initialized ADXL345 driver.

use accel_config::{DeviceCfg, RangeCfg};
use accel_hardware::{Adxl345, Adxl345Config, DataRate, Range, SimulatedBus};
use accel_traits::Accelerometer;
use eyre::WrapErr;

/// Overrides the simulated DEVID byte (decimal or `0x`-prefixed hex).
pub const SIM_DEVICE_ID_ENV: &str = "ACCEL_SIM_DEVICE_ID";

pub type Sensor = Box<dyn Accelerometer + Send>;

pub fn device_config(cfg: &DeviceCfg) -> eyre::Result<Adxl345Config> {
    let rate = DataRate::from_hz(cfg.data_rate_hz)
        .ok_or_else(|| eyre::eyre!("unsupported data rate {} Hz", cfg.data_rate_hz))?;
    let range = match cfg.range {
        RangeCfg::G2 => Range::G2,
        RangeCfg::G4 => Range::G4,
        RangeCfg::G8 => Range::G8,
        RangeCfg::G16 => Range::G16,
    };
    Ok(Adxl345Config {
        bus: cfg.bus,
        address: cfg.address,
        expected_id: cfg.expected_id,
        scale_mg_per_lsb: cfg.scale_mg_per_lsb,
        range,
        rate,
        offsets: cfg.offsets,
    })
}

/// Build the driver and run its identity check and register setup.
pub fn open_sensor(cfg: &DeviceCfg, simulate: bool) -> eyre::Result<Sensor> {
    let hw = device_config(cfg)?;
    if simulate {
        let mut bus = SimulatedBus::new().with_motion();
        if let Some(id) = sim_device_id()? {
            bus = bus.with_device_id(id);
        }
        let mut dev = Adxl345::new(bus, hw);
        dev.init()?;
        tracing::info!(address = hw.address, "simulated adxl345 ready");
        return Ok(Box::new(dev));
    }
    open_hardware(hw)
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_hardware(hw: Adxl345Config) -> eyre::Result<Sensor> {
    let bus = accel_hardware::i2c::I2cBus::open(hw.bus, hw.address)
        .wrap_err_with(|| format!("open i2c bus {} at {:#04x}", hw.bus, hw.address))?;
    let mut dev = Adxl345::new(bus, hw);
    dev.init()?;
    tracing::info!(bus = hw.bus, address = hw.address, rate_hz = hw.rate.hz(), "adxl345 ready");
    Ok(Box::new(dev))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn open_hardware(_hw: Adxl345Config) -> eyre::Result<Sensor> {
    eyre::bail!("hardware support not compiled in; rebuild with --features hardware or pass --simulate")
}

fn sim_device_id() -> eyre::Result<Option<u8>> {
    let Ok(raw) = std::env::var(SIM_DEVICE_ID_ENV) else {
        return Ok(None);
    };
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse::<u8>(),
    };
    parsed
        .map(Some)
        .wrap_err_with(|| format!("{SIM_DEVICE_ID_ENV}={raw} is not a byte"))
}
