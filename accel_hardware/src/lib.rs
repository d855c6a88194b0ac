pub mod adxl345;
pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod i2c;

pub use adxl345::{Adxl345, Adxl345Config, DataFormat, DataRate, PowerCtl, Range, Register};

use accel_traits::{BoxError, RegisterBus};
use adxl345::DEVICE_ID;
use error::HwError;

const REGISTER_SPACE: usize = 0x40;

/// In-memory ADXL345 register file.
///
/// Single-byte writes set the register pointer, longer writes store values at
/// consecutive addresses, reads return bytes from the pointer onwards. With
/// `with_motion()` every burst read from DATAX0 produces the next point of a
/// synthetic gait-like waveform.
pub struct SimulatedBus {
    regs: [u8; REGISTER_SPACE],
    pointer: u8,
    writes: Vec<Vec<u8>>,
    data_reads: u64,
    fail_reads: u32,
    motion: bool,
}

impl Default for SimulatedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBus {
    pub fn new() -> Self {
        let mut regs = [0u8; REGISTER_SPACE];
        regs[Register::DevId.addr() as usize] = DEVICE_ID;
        SimulatedBus {
            regs,
            pointer: 0,
            writes: Vec::new(),
            data_reads: 0,
            fail_reads: 0,
            motion: false,
        }
    }

    pub fn with_device_id(mut self, id: u8) -> Self {
        self.regs[Register::DevId.addr() as usize] = id;
        self
    }

    pub fn with_motion(mut self) -> Self {
        self.motion = true;
        self
    }

    /// Preload the data registers with raw counts.
    pub fn set_axes(&mut self, x: i16, y: i16, z: i16) {
        let base = Register::DataX0.addr() as usize;
        for (i, v) in [x, y, z].into_iter().enumerate() {
            let [lo, hi] = v.to_le_bytes();
            self.regs[base + 2 * i] = lo;
            self.regs[base + 2 * i + 1] = hi;
        }
    }

    /// Fail the next `n` reads with a bus error.
    pub fn fail_next_reads(&mut self, n: u32) {
        self.fail_reads = n;
    }

    /// Multi-byte writes (register writes) in the order they happened.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    pub fn register(&self, reg: Register) -> u8 {
        self.regs[reg.addr() as usize]
    }

    /// Number of burst reads served from DATAX0.
    pub fn data_reads(&self) -> u64 {
        self.data_reads
    }

    fn advance_motion(&mut self) {
        let t = self.data_reads as f32 * std::f32::consts::TAU / 200.0;
        let x = (60.0 * t.sin()) as i16;
        let y = (256.0 + 40.0 * (2.0 * t).sin()) as i16;
        let z = (25.0 * t.cos()) as i16;
        self.set_axes(x, y, z);
    }
}

impl RegisterBus for SimulatedBus {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BoxError> {
        let Some((&reg, values)) = bytes.split_first() else {
            return Err(Box::new(HwError::Bus("empty write".into())));
        };
        if reg as usize >= REGISTER_SPACE {
            return Err(Box::new(HwError::Bus(format!(
                "register {reg:#04x} out of range"
            ))));
        }
        self.pointer = reg;
        if !values.is_empty() {
            for (i, v) in values.iter().enumerate() {
                let idx = (reg as usize + i) % REGISTER_SPACE;
                self.regs[idx] = *v;
            }
            self.writes.push(bytes.to_vec());
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), BoxError> {
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(Box::new(HwError::Bus("simulated read failure".into())));
        }
        if self.pointer == Register::DataX0.addr() {
            if self.motion {
                self.advance_motion();
            }
            self.data_reads += 1;
        }
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.regs[(self.pointer as usize + i) % REGISTER_SPACE];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_bus_serves_register_pointer_reads() {
        let mut bus = SimulatedBus::new();
        let mut id = [0u8; 1];
        bus.write(&[Register::DevId.addr()]).unwrap();
        bus.read(&mut id).unwrap();
        assert_eq!(id[0], DEVICE_ID);
        assert!(bus.writes().is_empty(), "pointer writes are not recorded");
    }

    #[test]
    fn motion_changes_successive_samples() {
        let mut bus = SimulatedBus::new().with_motion();
        let mut a = [0u8; 6];
        let mut b = [0u8; 6];
        bus.write(&[Register::DataX0.addr()]).unwrap();
        bus.read(&mut a).unwrap();
        bus.write(&[Register::DataX0.addr()]).unwrap();
        bus.read(&mut b).unwrap();
        assert_ne!(a, b);
        assert_eq!(bus.data_reads(), 2);
    }
}
