pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Boxed error used at every trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One triaxial acceleration reading in milli-g.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RawSample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Byte-level access to a register-addressed peripheral on a shared bus.
///
/// A register read is modelled as `write(&[reg])` followed by `read(buf)`,
/// a register write as `write(&[reg, value])`.
pub trait RegisterBus {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BoxError>;
    fn read(&mut self, buf: &mut [u8]) -> Result<(), BoxError>;
}

pub trait Accelerometer {
    fn read(&mut self) -> Result<RawSample, BoxError>;

    /// Put the sensor back into a low-power state. Default: nothing to do.
    fn standby(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<A: Accelerometer + ?Sized> Accelerometer for Box<A> {
    fn read(&mut self) -> Result<RawSample, BoxError> {
        (**self).read()
    }

    fn standby(&mut self) -> Result<(), BoxError> {
        (**self).standby()
    }
}
