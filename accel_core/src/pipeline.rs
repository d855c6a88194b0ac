//! Orchestrator: connects the stream, then runs acquisition, tick and dispatch threads.
//!
//! Threads:
//! - acquisition: reads the sensor and records samples into the context
//! - tick: on a timer, reduces the buffer to a window and appends it to the batch
//! - dispatch: classifies full batches and publishes the results
//!
//! Full batches leave the context through a bounded channel, so a slow
//! classifier or stream never blocks acquisition. When the channel is full the
//! newest batch is dropped and counted.
//!
//! Each `Pipeline` owns its threads and stops them when dropped.
use accel_traits::{Accelerometer, Clock};
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::{PipelineCfg, StreamCfg};
use crate::context::PipelineContext;
use crate::dispatch::{DispatchClient, DispatchTarget};
use crate::error::{PipelineError, Result};
use crate::publisher::{Connector, StreamPublisher};
use crate::stats::{StatsSnapshot, bump};
use crate::types::{Batch, StreamMessage};

/// Everything `Pipeline::start` needs besides the collaborators.
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    pub pipeline: PipelineCfg,
    pub stream: StreamCfg,
    /// External stop flag (e.g. a Ctrl-C handler). A fresh one is created when unset.
    pub shutdown: Option<Arc<AtomicBool>>,
}

pub struct Pipeline {
    ctx: Arc<PipelineContext>,
    shutdown: Arc<AtomicBool>,
    acquire: Option<JoinHandle<()>>,
    tick: Option<JoinHandle<()>>,
    dispatch: Option<JoinHandle<()>>,
}

impl Pipeline {
    /// Connect the stream (retrying until it succeeds), then start sampling.
    ///
    /// No sensor read happens before the connection is up. Returns
    /// `PipelineError::Stopped` if the stop flag is raised while connecting.
    pub fn start<A, T, K, C>(
        sensor: A,
        target: T,
        connector: K,
        clock: C,
        params: RunParams,
    ) -> Result<Self>
    where
        A: Accelerometer + Send + 'static,
        T: DispatchTarget + Send + 'static,
        K: Connector + Send + 'static,
        K::Conn: Send + 'static,
        C: Clock + Clone + Send + 'static,
    {
        let RunParams {
            pipeline: cfg,
            stream,
            shutdown,
        } = params;
        cfg.validate()?;
        let shutdown = shutdown.unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
        let ctx = Arc::new(PipelineContext::new(cfg.batch_size)?);

        let mut publisher = StreamPublisher::new(
            connector,
            clock.clone(),
            stream.url.clone(),
            stream.connect_backoff,
        );
        publisher.connect(&shutdown)?;

        let (tx, rx) = xch::bounded::<Batch>(cfg.handoff_capacity);

        // Built before spawning so an early return stops whatever already runs.
        let mut pipeline = Self {
            ctx: ctx.clone(),
            shutdown: shutdown.clone(),
            acquire: None,
            tick: None,
            dispatch: None,
        };

        pipeline.dispatch = Some({
            let ctx = ctx.clone();
            let shutdown = shutdown.clone();
            spawn_named("accel-dispatch", move || {
                dispatch_loop(DispatchClient::new(target), publisher, rx, &ctx, &shutdown)
            })?
        });
        pipeline.tick = Some({
            let ctx = ctx.clone();
            let shutdown = shutdown.clone();
            let period = cfg.tick;
            spawn_named("accel-tick", move || tick_loop(&ctx, period, tx, &shutdown))?
        });
        pipeline.acquire = Some({
            let interval = cfg.acquire_interval;
            spawn_named("accel-acquire", move || {
                acquisition_loop(sensor, &ctx, &clock, interval, &shutdown)
            })?
        });

        tracing::info!(
            tick_ms = cfg.tick.as_millis() as u64,
            batch_size = cfg.batch_size,
            url = %stream.url,
            "pipeline started"
        );
        Ok(pipeline)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.ctx.stats().snapshot()
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn is_stopping(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Signal every thread and wait for them, acquisition first.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for (name, handle) in [
            ("acquisition", self.acquire.take()),
            ("tick", self.tick.take()),
            ("dispatch", self.dispatch.take()),
        ] {
            let Some(handle) = handle else { continue };
            match handle.join() {
                Ok(()) => tracing::trace!(thread = name, "pipeline thread joined"),
                Err(e) => tracing::warn!(thread = name, ?e, "pipeline thread panicked"),
            }
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_named<F>(name: &'static str, f: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map_err(|e| eyre::Report::new(e).wrap_err(PipelineError::Spawn(name)))
}

fn acquisition_loop<A: Accelerometer, C: Clock>(
    mut sensor: A,
    ctx: &PipelineContext,
    clock: &C,
    interval: Duration,
    shutdown: &AtomicBool,
) {
    let mut failing: u64 = 0;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!("acquisition received shutdown signal");
            break;
        }

        match sensor.read() {
            Ok(sample) => {
                if failing > 0 {
                    tracing::info!(failed_reads = failing, "sensor reads recovered");
                    failing = 0;
                }
                ctx.record(sample);
            }
            Err(e) => {
                bump(&ctx.stats().read_errors);
                failing += 1;
                if failing == 1 {
                    tracing::warn!(error = %e, "sensor read failed");
                } else {
                    tracing::trace!(error = %e, failing, "sensor read failed");
                }
            }
        }

        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        clock.sleep(interval);
    }

    if let Err(e) = sensor.standby() {
        tracing::warn!(error = %e, "failed to put sensor into standby");
    }
    tracing::trace!("acquisition thread exiting cleanly");
}

fn tick_loop(
    ctx: &PipelineContext,
    period: Duration,
    tx: xch::Sender<Batch>,
    shutdown: &AtomicBool,
) {
    let ticker = xch::tick(period);
    loop {
        if ticker.recv().is_err() || shutdown.load(Ordering::Relaxed) {
            break;
        }
        let Some(batch) = ctx.tick().batch else {
            continue;
        };
        match tx.try_send(batch) {
            Ok(()) => tracing::trace!("batch handed to dispatch"),
            Err(xch::TrySendError::Full(batch)) => {
                bump(&ctx.stats().batches_dropped);
                tracing::warn!(windows = batch.len(), "dispatch busy, dropping batch");
            }
            Err(xch::TrySendError::Disconnected(_)) => {
                tracing::debug!("dispatch thread gone, stopping tick thread");
                break;
            }
        }
    }
    // Dropping `tx` lets the dispatch thread drain and exit.
    tracing::trace!("tick thread exiting cleanly");
}

fn dispatch_loop<T, K, C>(
    mut client: DispatchClient<T>,
    mut publisher: StreamPublisher<K, C>,
    rx: xch::Receiver<Batch>,
    ctx: &PipelineContext,
    shutdown: &AtomicBool,
) where
    T: DispatchTarget,
    K: Connector,
    C: Clock,
{
    for batch in rx.iter() {
        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!(windows = batch.len(), "discarding batch on shutdown");
            continue;
        }

        bump(&ctx.stats().dispatches);
        let result = match client.dispatch(&batch) {
            Ok(r) => r,
            Err(e) => {
                bump(&ctx.stats().dispatch_failures);
                tracing::error!(error = %e, windows = batch.len(), "dispatch failed, batch discarded");
                continue;
            }
        };

        let (label, score) = result.top();
        tracing::debug!(top = label.wire_key(), score, "batch classified");
        match publisher.publish(&StreamMessage::from(&result)) {
            Ok(()) => bump(&ctx.stats().published),
            Err(e) => {
                bump(&ctx.stats().publish_failures);
                tracing::warn!(error = %e, url = publisher.url(), "publish failed, message dropped");
            }
        }
    }
    tracing::trace!("dispatch thread exiting cleanly");
}
