//! Fixed-size grouping of consecutive windows.

use crate::error::BuildError;
use crate::types::{Batch, WindowAverage};

#[derive(Debug)]
pub struct WindowBatcher {
    capacity: usize,
    in_flight: Vec<WindowAverage>,
}

impl WindowBatcher {
    pub fn new(capacity: usize) -> Result<Self, BuildError> {
        if capacity == 0 {
            return Err(BuildError::ZeroBatchSize);
        }
        Ok(Self {
            capacity,
            in_flight: Vec::with_capacity(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Windows collected toward the next batch.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Add a window; once `capacity` windows are held they are returned as a
    /// batch and the in-flight slot starts over empty.
    pub fn append(&mut self, w: WindowAverage) -> Option<Batch> {
        self.in_flight.push(w);
        if self.in_flight.len() < self.capacity {
            return None;
        }
        Some(Batch::from(self.in_flight.drain(..).collect::<Vec<_>>()))
    }
}
