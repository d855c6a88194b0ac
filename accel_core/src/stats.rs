//! Pipeline counters. Every failure that does not stop the pipeline shows up here.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Stats {
    pub(crate) samples: AtomicU64,
    pub(crate) read_errors: AtomicU64,
    pub(crate) windows: AtomicU64,
    pub(crate) batches: AtomicU64,
    pub(crate) batches_dropped: AtomicU64,
    pub(crate) dispatches: AtomicU64,
    pub(crate) dispatch_failures: AtomicU64,
    pub(crate) published: AtomicU64,
    pub(crate) publish_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub samples: u64,
    pub read_errors: u64,
    pub windows: u64,
    pub batches: u64,
    pub batches_dropped: u64,
    pub dispatches: u64,
    pub dispatch_failures: u64,
    pub published: u64,
    pub publish_failures: u64,
}

#[inline]
pub(crate) fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl Stats {
    pub fn snapshot(&self) -> StatsSnapshot {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            samples: get(&self.samples),
            read_errors: get(&self.read_errors),
            windows: get(&self.windows),
            batches: get(&self.batches),
            batches_dropped: get(&self.batches_dropped),
            dispatches: get(&self.dispatches),
            dispatch_failures: get(&self.dispatch_failures),
            published: get(&self.published),
            publish_failures: get(&self.publish_failures),
        }
    }
}
