#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Accelerometer activity pipeline (hardware-agnostic).
//!
//! All hardware and network interactions go through traits: the sensor via
//! `accel_traits::Accelerometer`, the classifier via `DispatchTarget`, the
//! outbound stream via `Connector`/`Connection`.
//!
//! ## Architecture
//!
//! - **Windowing**: raw samples are averaged per tick (`window`)
//! - **Batching**: consecutive windows grouped into fixed-size batches (`batcher`)
//! - **Shared state**: buffer and in-flight batch behind one lock (`context`)
//! - **Dispatch**: batch -> classifier -> per-class scores (`dispatch`)
//! - **Publish**: scores -> JSON text frame on a persistent connection (`publisher`)
//! - **Orchestration**: acquisition, tick and dispatch threads (`pipeline`)

pub mod batcher;
pub mod config;
pub mod context;
pub mod conversions;
pub mod dispatch;
pub mod error;
pub mod mocks;
pub mod pipeline;
pub mod publisher;
pub mod stats;
pub mod types;
pub mod window;

pub use config::{PipelineCfg, StreamCfg};
pub use context::{PipelineContext, TickOutcome};
pub use dispatch::{ClassifyRequest, ClassifyResponse, DispatchClient, DispatchTarget};
pub use error::{BuildError, DispatchError, PipelineError, PublishError};
pub use pipeline::{Pipeline, RunParams};
pub use publisher::{Connection, Connector, StreamPublisher};
pub use stats::StatsSnapshot;
pub use types::{Batch, ClassLabel, ClassificationResult, StreamMessage, WindowAverage};
