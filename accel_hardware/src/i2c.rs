use accel_traits::{BoxError, RegisterBus};
use rppal::i2c::I2c;
use tracing::trace;

use crate::error::{HwError, Result};

/// Linux I2C adapter (`/dev/i2c-N`) bound to one slave address.
pub struct I2cBus {
    i2c: I2c,
}

impl I2cBus {
    pub fn open(bus: u8, address: u16) -> Result<Self> {
        let mut i2c = I2c::with_bus(bus).map_err(|e| HwError::I2c(e.to_string()))?;
        i2c.set_slave_address(address)
            .map_err(|e| HwError::I2c(e.to_string()))?;
        trace!(bus, address, "i2c bus opened");
        Ok(Self { i2c })
    }
}

impl RegisterBus for I2cBus {
    fn write(&mut self, bytes: &[u8]) -> std::result::Result<(), BoxError> {
        let n = self.i2c.write(bytes)?;
        if n != bytes.len() {
            return Err(Box::new(HwError::Bus(format!(
                "short write: {n} of {} bytes",
                bytes.len()
            ))));
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> std::result::Result<(), BoxError> {
        let n = self.i2c.read(buf)?;
        if n != buf.len() {
            return Err(Box::new(HwError::Bus(format!(
                "short read: {n} of {} bytes",
                buf.len()
            ))));
        }
        Ok(())
    }
}
