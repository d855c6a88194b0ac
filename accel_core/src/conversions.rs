//! `From` implementations bridging `accel_config` types to `accel_core` types.

use std::time::Duration;

use crate::config::{PipelineCfg, StreamCfg};

impl From<&accel_config::PipelineCfg> for PipelineCfg {
    fn from(c: &accel_config::PipelineCfg) -> Self {
        Self {
            tick: Duration::from_millis(c.tick_ms),
            batch_size: c.batch_size,
            acquire_interval: Duration::from_micros(c.acquire_interval_us),
            handoff_capacity: c.handoff_capacity,
        }
    }
}

impl From<&accel_config::StreamCfg> for StreamCfg {
    fn from(c: &accel_config::StreamCfg) -> Self {
        Self {
            url: c.url.clone(),
            connect_backoff: Duration::from_millis(c.connect_backoff_ms),
        }
    }
}
