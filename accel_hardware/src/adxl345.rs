//! ADXL345 register protocol over any `RegisterBus`.
//!
//! Register reads are "write the address, then read", register writes are a
//! single `[reg, value]` transfer. Data registers are read as one 6-byte burst.
use accel_traits::{Accelerometer, BoxError, RawSample, RegisterBus};
use std::ops::BitOr;
use tracing::{debug, trace};

use crate::error::{HwError, Result};

/// Identity byte reported by a genuine ADXL345 in DEVID.
pub const DEVICE_ID: u8 = 0xE5;
/// Full-resolution scale factor in mg/LSB, identical for all ranges.
pub const FULL_RES_SCALE_MG_PER_LSB: f32 = 3.9;
/// Default 7-bit address with ALT ADDRESS pulled low.
pub const DEFAULT_ADDRESS: u16 = 0x53;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    DevId = 0x00,
    ThreshTap = 0x1D,
    OfsX = 0x1E,
    OfsY = 0x1F,
    OfsZ = 0x20,
    Dur = 0x21,
    Latent = 0x22,
    Window = 0x23,
    ThreshAct = 0x24,
    ThreshInact = 0x25,
    TimeInact = 0x26,
    ActInactCtl = 0x27,
    ThreshFf = 0x28,
    TimeFf = 0x29,
    TapAxes = 0x2A,
    ActTapStatus = 0x2B,
    BwRate = 0x2C,
    PowerCtl = 0x2D,
    IntEnable = 0x2E,
    IntMap = 0x2F,
    IntSource = 0x30,
    DataFormat = 0x31,
    DataX0 = 0x32,
    DataX1 = 0x33,
    DataY0 = 0x34,
    DataY1 = 0x35,
    DataZ0 = 0x36,
    DataZ1 = 0x37,
    FifoCtl = 0x38,
    FifoStatus = 0x39,
}

impl Register {
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

macro_rules! register_flags {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* const $flag:ident = $bits:expr; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name(u8);

        impl $name {
            $( $(#[$fmeta])* pub const $flag: Self = Self($bits); )*

            #[inline]
            pub const fn empty() -> Self {
                Self(0)
            }

            #[inline]
            pub const fn bits(self) -> u8 {
                self.0
            }

            #[inline]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl BitOr for $name {
            type Output = Self;

            #[inline]
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }
    };
}

register_flags! {
    /// DATA_FORMAT bits. The low two bits select the measurement range.
    pub struct DataFormat {
        const RANGE_2G = 0x00;
        const RANGE_4G = 0x01;
        const RANGE_8G = 0x02;
        const RANGE_16G = 0x03;
        /// Left-justified (MSB) mode.
        const JUSTIFY = 0x04;
        const FULL_RES = 0x08;
        const INT_INVERT = 0x20;
        /// 3-wire SPI.
        const SPI = 0x40;
        const SELF_TEST = 0x80;
    }
}

register_flags! {
    /// POWER_CTL bits. The low two bits select the wakeup rate while asleep.
    pub struct PowerCtl {
        const WAKEUP_8HZ = 0x00;
        const WAKEUP_4HZ = 0x01;
        const WAKEUP_2HZ = 0x02;
        const WAKEUP_1HZ = 0x03;
        const SLEEP = 0x04;
        const MEASURE = 0x08;
        const AUTO_SLEEP = 0x10;
        const LINK = 0x20;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Range {
    G2,
    G4,
    G8,
    #[default]
    G16,
}

impl Range {
    pub const fn flags(self) -> DataFormat {
        match self {
            Range::G2 => DataFormat::RANGE_2G,
            Range::G4 => DataFormat::RANGE_4G,
            Range::G8 => DataFormat::RANGE_8G,
            Range::G16 => DataFormat::RANGE_16G,
        }
    }
}

/// BW_RATE output data rate codes (normal power).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DataRate {
    Hz6_25 = 0x06,
    Hz12_5 = 0x07,
    Hz25 = 0x08,
    Hz50 = 0x09,
    Hz100 = 0x0A,
    Hz200 = 0x0B,
    #[default]
    Hz400 = 0x0C,
    Hz800 = 0x0D,
    Hz1600 = 0x0E,
    Hz3200 = 0x0F,
}

impl DataRate {
    const ALL: [DataRate; 10] = [
        DataRate::Hz6_25,
        DataRate::Hz12_5,
        DataRate::Hz25,
        DataRate::Hz50,
        DataRate::Hz100,
        DataRate::Hz200,
        DataRate::Hz400,
        DataRate::Hz800,
        DataRate::Hz1600,
        DataRate::Hz3200,
    ];

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn hz(self) -> f32 {
        match self {
            DataRate::Hz6_25 => 6.25,
            DataRate::Hz12_5 => 12.5,
            DataRate::Hz25 => 25.0,
            DataRate::Hz50 => 50.0,
            DataRate::Hz100 => 100.0,
            DataRate::Hz200 => 200.0,
            DataRate::Hz400 => 400.0,
            DataRate::Hz800 => 800.0,
            DataRate::Hz1600 => 1600.0,
            DataRate::Hz3200 => 3200.0,
        }
    }

    /// Exact match against the supported rates.
    pub fn from_hz(hz: f32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.hz() == hz)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adxl345Config {
    /// Bus index; informational for error messages, the bus is already open.
    pub bus: u8,
    pub address: u16,
    pub expected_id: u8,
    pub scale_mg_per_lsb: f32,
    pub range: Range,
    pub rate: DataRate,
    /// Per-axis trim written to OFSX/OFSY/OFSZ when set.
    pub offsets: Option<[i8; 3]>,
}

impl Default for Adxl345Config {
    fn default() -> Self {
        Self {
            bus: 1,
            address: DEFAULT_ADDRESS,
            expected_id: DEVICE_ID,
            scale_mg_per_lsb: FULL_RES_SCALE_MG_PER_LSB,
            range: Range::default(),
            rate: DataRate::default(),
            offsets: None,
        }
    }
}

pub struct Adxl345<B> {
    bus: B,
    cfg: Adxl345Config,
}

impl<B: RegisterBus> Adxl345<B> {
    pub fn new(bus: B, cfg: Adxl345Config) -> Self {
        Self { bus, cfg }
    }

    pub fn config(&self) -> &Adxl345Config {
        &self.cfg
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Verify DEVID, then configure range, data rate, offsets and enter measurement mode.
    pub fn init(&mut self) -> Result<()> {
        self.check_device_id()?;

        let format = self.cfg.range.flags() | DataFormat::FULL_RES;
        self.set_register(Register::DataFormat, format.bits())?;
        self.set_register(Register::BwRate, self.cfg.rate.code())?;
        if let Some([x, y, z]) = self.cfg.offsets {
            self.set_register(Register::OfsX, x as u8)?;
            self.set_register(Register::OfsY, y as u8)?;
            self.set_register(Register::OfsZ, z as u8)?;
        }
        self.set_register(Register::PowerCtl, PowerCtl::MEASURE.bits())?;

        debug!(
            bus = self.cfg.bus,
            address = self.cfg.address,
            format = format.bits(),
            rate_hz = self.cfg.rate.hz(),
            "adxl345 initialized"
        );
        Ok(())
    }

    /// Burst-read DATAX0..DATAZ1 and scale to milli-g.
    pub fn read_sample(&mut self) -> Result<RawSample> {
        let mut data = [0u8; 6];
        self.bus
            .write(&[Register::DataX0.addr()])
            .map_err(bus_err)?;
        self.bus.read(&mut data).map_err(bus_err)?;
        let sample = decode_sample(&data, self.cfg.scale_mg_per_lsb);
        trace!(x = sample.x, y = sample.y, z = sample.z, "adxl345 sample");
        Ok(sample)
    }

    /// Clear POWER_CTL, returning the part to standby.
    pub fn shutdown(&mut self) -> Result<()> {
        self.set_register(Register::PowerCtl, PowerCtl::empty().bits())
    }

    pub fn read_register(&mut self, reg: Register) -> Result<u8> {
        let mut data = [0u8; 1];
        self.bus.write(&[reg.addr()]).map_err(bus_err)?;
        self.bus.read(&mut data).map_err(bus_err)?;
        Ok(data[0])
    }

    pub fn set_register(&mut self, reg: Register, value: u8) -> Result<()> {
        self.bus.write(&[reg.addr(), value]).map_err(bus_err)
    }

    fn check_device_id(&mut self) -> Result<()> {
        let found = self.read_register(Register::DevId)?;
        if found != self.cfg.expected_id {
            return Err(HwError::DeviceMismatch {
                bus: self.cfg.bus,
                address: self.cfg.address,
                expected: self.cfg.expected_id,
                found,
            });
        }
        Ok(())
    }
}

impl<B: RegisterBus> Accelerometer for Adxl345<B> {
    fn read(&mut self) -> std::result::Result<RawSample, BoxError> {
        Ok(self.read_sample()?)
    }

    fn standby(&mut self) -> std::result::Result<(), BoxError> {
        Ok(self.shutdown()?)
    }
}

/// Decode three little-endian i16 (x, y, z) and apply the scale factor.
pub fn decode_sample(data: &[u8; 6], scale: f32) -> RawSample {
    let x = i16::from_le_bytes([data[0], data[1]]);
    let y = i16::from_le_bytes([data[2], data[3]]);
    let z = i16::from_le_bytes([data[4], data[5]]);
    RawSample::new(
        f32::from(x) * scale,
        f32::from(y) * scale,
        f32::from(z) * scale,
    )
}

fn bus_err(e: BoxError) -> HwError {
    match e.downcast::<HwError>() {
        Ok(hw) => *hw,
        Err(other) => HwError::Bus(other.to_string()),
    }
}
