//! `run` and `self-check` commands.

use accel_config::Config;
use accel_core::{Pipeline, PipelineError, RunParams, StatsSnapshot};
use accel_traits::MonotonicClock;
use eyre::WrapErr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::device::open_sensor;
use crate::target::HttpTarget;
use crate::transport::WsConnector;

const POLL: Duration = Duration::from_millis(100);

pub fn run(cfg: &Config, simulate: bool, stats_every: Duration, json: bool) -> eyre::Result<()> {
    let sensor = open_sensor(&cfg.device, simulate)?;
    let target = HttpTarget::new(
        cfg.dispatch.url.clone(),
        Duration::from_millis(cfg.dispatch.timeout_ms),
    )?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::Relaxed);
        })
        .wrap_err("install Ctrl-C handler")?;
    }

    let params = RunParams {
        pipeline: (&cfg.pipeline).into(),
        stream: (&cfg.stream).into(),
        shutdown: Some(shutdown.clone()),
    };
    tracing::info!(url = %cfg.stream.url, "connecting to result stream");
    let mut pipeline =
        match Pipeline::start(sensor, target, WsConnector, MonotonicClock::new(), params) {
            Ok(p) => p,
            Err(e) if matches!(e.downcast_ref::<PipelineError>(), Some(PipelineError::Stopped)) => {
                tracing::info!("interrupted before the stream connected");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

    let mut last_report = Instant::now();
    while !pipeline.is_stopping() {
        std::thread::sleep(POLL);
        if !stats_every.is_zero() && last_report.elapsed() >= stats_every {
            log_stats(&pipeline.stats());
            last_report = Instant::now();
        }
    }

    tracing::info!("shutting down");
    pipeline.stop();
    print_stats(&pipeline.stats(), json)
}

pub fn self_check(cfg: &Config, simulate: bool, json: bool) -> eyre::Result<()> {
    let mut sensor = open_sensor(&cfg.device, simulate)?;
    let sample = sensor
        .read()
        .map_err(|e| eyre::eyre!(e))
        .wrap_err("read one sample")?;
    if let Err(e) = sensor.standby() {
        tracing::warn!(error = %e, "failed to put sensor into standby");
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "simulated": simulate,
                "x_mg": sample.x,
                "y_mg": sample.y,
                "z_mg": sample.z,
            })
        );
    } else {
        println!(
            "ok: x={:.1} mg y={:.1} mg z={:.1} mg{}",
            sample.x,
            sample.y,
            sample.z,
            if simulate { " (simulated)" } else { "" }
        );
    }
    Ok(())
}

fn log_stats(s: &StatsSnapshot) {
    tracing::info!(
        samples = s.samples,
        read_errors = s.read_errors,
        windows = s.windows,
        batches = s.batches,
        batches_dropped = s.batches_dropped,
        dispatch_failures = s.dispatch_failures,
        published = s.published,
        publish_failures = s.publish_failures,
        "pipeline stats"
    );
}

fn print_stats(s: &StatsSnapshot, json: bool) -> eyre::Result<()> {
    if json {
        println!("{}", serde_json::to_string(s).wrap_err("serialize stats")?);
        return Ok(());
    }
    println!(
        "samples: {} (read errors: {})\nwindows: {}\nbatches: {} (dropped: {})\ndispatches: {} (failed: {})\npublished: {} (failed: {})",
        s.samples,
        s.read_errors,
        s.windows,
        s.batches,
        s.batches_dropped,
        s.dispatches,
        s.dispatch_failures,
        s.published,
        s.publish_failures
    );
    Ok(())
}
