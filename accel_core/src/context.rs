//! Shared acquisition state: the sample buffer and the in-flight batch behind one lock.
//!
//! The acquisition thread calls `record`, the tick thread calls `tick`. Both
//! take the same mutex, so every sample lands in exactly one window and every
//! window in exactly one batch.
use accel_traits::RawSample;
use std::sync::{Mutex, MutexGuard};

use crate::batcher::WindowBatcher;
use crate::error::BuildError;
use crate::stats::{Stats, bump};
use crate::types::{Batch, WindowAverage};
use crate::window::SampleWindow;

#[derive(Debug)]
struct Shared {
    window: SampleWindow,
    batcher: WindowBatcher,
}

/// Result of one tick.
#[derive(Debug, Default, PartialEq)]
pub struct TickOutcome {
    /// `None` when no sample arrived during the tick.
    pub window: Option<WindowAverage>,
    /// Set when this window completed a batch.
    pub batch: Option<Batch>,
}

#[derive(Debug)]
pub struct PipelineContext {
    shared: Mutex<Shared>,
    stats: Stats,
}

impl PipelineContext {
    pub fn new(batch_size: usize) -> Result<Self, BuildError> {
        Ok(Self {
            shared: Mutex::new(Shared {
                window: SampleWindow::with_capacity(64),
                batcher: WindowBatcher::new(batch_size)?,
            }),
            stats: Stats::default(),
        })
    }

    // The guarded data is plain buffers, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn record(&self, s: RawSample) {
        self.lock().window.push(s);
        bump(&self.stats.samples);
    }

    /// Reduce the buffer to one window and append it to the in-flight batch,
    /// atomically with respect to `record`.
    pub fn tick(&self) -> TickOutcome {
        let mut shared = self.lock();
        let Some(avg) = shared.window.take_average() else {
            return TickOutcome::default();
        };
        let batch = shared.batcher.append(avg);
        drop(shared);

        bump(&self.stats.windows);
        if batch.is_some() {
            bump(&self.stats.batches);
        }
        TickOutcome {
            window: Some(avg),
            batch,
        }
    }

    /// Samples waiting for the next tick.
    pub fn buffered(&self) -> usize {
        self.lock().window.len()
    }

    /// Windows waiting for the batch to fill.
    pub fn pending_windows(&self) -> usize {
        self.lock().batcher.pending()
    }

    pub fn batch_size(&self) -> usize {
        self.lock().batcher.capacity()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tick_emits_no_window() {
        let ctx = PipelineContext::new(2).unwrap();
        assert_eq!(ctx.tick(), TickOutcome::default());
        assert_eq!(ctx.stats().snapshot().windows, 0);
    }

    #[test]
    fn tick_resets_buffer_and_fills_batch() {
        let ctx = PipelineContext::new(2).unwrap();
        ctx.record(RawSample::new(2.0, 4.0, 6.0));
        ctx.record(RawSample::new(4.0, 8.0, 12.0));

        let first = ctx.tick();
        assert_eq!(first.window, Some(WindowAverage::new(3.0, 6.0, 9.0)));
        assert!(first.batch.is_none());
        assert_eq!(ctx.buffered(), 0);
        assert_eq!(ctx.pending_windows(), 1);

        ctx.record(RawSample::new(1.0, 1.0, 1.0));
        let second = ctx.tick();
        let batch = second.batch.expect("batch of two");
        assert_eq!(batch.len(), 2);
        assert_eq!(ctx.pending_windows(), 0);

        let snap = ctx.stats().snapshot();
        assert_eq!((snap.samples, snap.windows, snap.batches), (3, 2, 1));
    }
}
