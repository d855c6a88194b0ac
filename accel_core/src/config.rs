//! Runtime configuration for the pipeline.
//!
//! Separate from the TOML schema in `accel_config`; see `conversions` for the mapping.
use std::time::Duration;

use crate::error::BuildError;

/// Windowing, batching and hand-off parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineCfg {
    /// Length of one averaging window.
    pub tick: Duration,
    /// Windows per classification batch.
    pub batch_size: usize,
    /// Pause between sensor reads; zero reads back-to-back.
    pub acquire_interval: Duration,
    /// Full batches allowed to queue for the dispatch thread.
    pub handoff_capacity: usize,
}

impl Default for PipelineCfg {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(50),
            batch_size: 11,
            acquire_interval: Duration::from_micros(2_500),
            handoff_capacity: 1,
        }
    }
}

impl PipelineCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.batch_size == 0 {
            return Err(BuildError::ZeroBatchSize);
        }
        if self.handoff_capacity == 0 {
            return Err(BuildError::ZeroHandoffCapacity);
        }
        if self.tick.is_zero() {
            return Err(BuildError::InvalidConfig("tick must be > 0"));
        }
        Ok(())
    }
}

/// Outbound stream endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamCfg {
    pub url: String,
    /// Fixed wait between connection attempts at startup.
    pub connect_backoff: Duration,
}

impl Default for StreamCfg {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8099/".to_string(),
            connect_backoff: Duration::from_secs(1),
        }
    }
}
