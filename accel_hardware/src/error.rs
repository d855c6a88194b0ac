use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error(
        "adxl345 at {address:#04x} on bus {bus} returned wrong device id {found:#04x} (expected {expected:#04x})"
    )]
    DeviceMismatch {
        bus: u8,
        address: u16,
        expected: u8,
        found: u8,
    },
    #[error("bus error: {0}")]
    Bus(String),
    #[error("i2c error: {0}")]
    I2c(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
