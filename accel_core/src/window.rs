//! Tick-window reduction: raw samples in, one per-axis mean out.

use accel_traits::RawSample;

use crate::types::WindowAverage;

/// Raw samples collected since the last tick boundary.
///
/// The backing storage is cleared, not reallocated, at every tick.
#[derive(Debug, Default)]
pub struct SampleWindow {
    samples: Vec<RawSample>,
}

impl SampleWindow {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
        }
    }

    #[inline]
    pub fn push(&mut self, s: RawSample) {
        self.samples.push(s);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Reduce the buffered samples to their mean and clear the buffer.
    /// Returns `None` (and leaves nothing behind) when no sample arrived.
    pub fn take_average(&mut self) -> Option<WindowAverage> {
        let avg = mean(&self.samples);
        self.samples.clear();
        avg
    }
}

/// Arithmetic mean per axis, accumulated in f64.
pub fn mean(samples: &[RawSample]) -> Option<WindowAverage> {
    if samples.is_empty() {
        return None;
    }
    let (sx, sy, sz) = samples.iter().fold((0.0f64, 0.0f64, 0.0f64), |acc, s| {
        (
            acc.0 + f64::from(s.x),
            acc.1 + f64::from(s.y),
            acc.2 + f64::from(s.z),
        )
    });
    let n = samples.len() as f64;
    Some(WindowAverage::new(sx / n, sy / n, sz / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_window_yields_nothing() {
        let mut w = SampleWindow::default();
        assert_eq!(w.take_average(), None);
        assert!(w.is_empty());
    }

    #[test]
    fn average_clears_the_buffer() {
        let mut w = SampleWindow::with_capacity(4);
        w.push(RawSample::new(1.0, 2.0, 3.0));
        w.push(RawSample::new(3.0, 4.0, 5.0));
        assert_eq!(w.take_average(), Some(WindowAverage::new(2.0, 3.0, 4.0)));
        assert_eq!(w.len(), 0);
        assert_eq!(w.take_average(), None);
    }

    proptest! {
        #[test]
        fn mean_matches_reference(
            xs in proptest::collection::vec((-16000i16..16000, -16000i16..16000, -16000i16..16000), 1..300)
        ) {
            let samples: Vec<RawSample> = xs
                .iter()
                .map(|&(x, y, z)| RawSample::new(f32::from(x), f32::from(y), f32::from(z)))
                .collect();
            let got = mean(&samples).unwrap();
            let n = xs.len() as f64;
            let ex = xs.iter().map(|v| f64::from(v.0)).sum::<f64>() / n;
            let ey = xs.iter().map(|v| f64::from(v.1)).sum::<f64>() / n;
            let ez = xs.iter().map(|v| f64::from(v.2)).sum::<f64>() / n;
            prop_assert!((got.x - ex).abs() < 1e-9);
            prop_assert!((got.y - ey).abs() < 1e-9);
            prop_assert!((got.z - ez).abs() < 1e-9);
        }
    }
}
