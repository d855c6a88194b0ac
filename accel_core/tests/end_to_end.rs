//! Full windowing -> batching -> dispatch -> publish path, driven tick by tick.

use accel_core::dispatch::DispatchClient;
use accel_core::mocks::{RecordingConnector, ScriptedTarget, response};
use accel_core::{PipelineContext, StreamMessage, StreamPublisher, WindowAverage};
use accel_hardware::{Adxl345, Adxl345Config, SimulatedBus};
use accel_traits::{Accelerometer, ManualClock, RawSample};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

const SAMPLES_PER_TICK: usize = 100;
const TICKS: usize = 11;

fn classifier() -> ScriptedTarget {
    ScriptedTarget::new(Ok(response(&[
        ("Walking", 0.7),
        ("Standing", 0.2),
        ("Jogging", 0.1),
    ])))
}

#[test]
fn eleven_ticks_of_constant_samples_publish_one_message() {
    let ctx = PipelineContext::new(11).expect("context");
    let target = classifier();
    let requests = target.requests();
    let mut client = DispatchClient::new(target);

    let connector = RecordingConnector::new();
    let sent = connector.sent();
    let mut publisher = StreamPublisher::new(
        connector,
        ManualClock::new(),
        "ws://test/",
        Duration::from_secs(1),
    );
    publisher.connect(&AtomicBool::new(false)).expect("connect");

    let mut dispatched = 0;
    for tick in 0..TICKS {
        for _ in 0..SAMPLES_PER_TICK {
            ctx.record(RawSample::new(100.0, 200.0, 300.0));
        }
        let out = ctx.tick();
        assert_eq!(out.window, Some(WindowAverage::new(100.0, 200.0, 300.0)));
        assert_eq!(ctx.buffered(), 0);

        if let Some(batch) = out.batch {
            assert_eq!(tick, TICKS - 1, "batch completes on the 11th tick only");
            assert_eq!(batch.len(), 11);
            assert!(
                batch
                    .windows()
                    .iter()
                    .all(|w| *w == WindowAverage::new(100.0, 200.0, 300.0))
            );
            let result = client.dispatch(&batch).expect("dispatch");
            publisher
                .publish(&StreamMessage::from(&result))
                .expect("publish");
            dispatched += 1;
        }
    }

    assert_eq!(dispatched, 1);
    assert_eq!(ctx.pending_windows(), 0);
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].accelerometer, vec![[100.0, 200.0, 300.0]; 11]);

    let sent = sent.lock().unwrap();
    assert_eq!(
        sent.as_slice(),
        [r#"{"walking":0.7,"standing":0.2,"jogging":0.1}"#.to_string()]
    );
}

#[test]
fn samples_read_through_the_register_driver_average_exactly() {
    let mut bus = SimulatedBus::new();
    bus.set_axes(100, 200, 300);
    let cfg = Adxl345Config {
        scale_mg_per_lsb: 1.0,
        ..Adxl345Config::default()
    };
    let mut sensor = Adxl345::new(bus, cfg);
    sensor.init().expect("init");

    let ctx = PipelineContext::new(TICKS).expect("context");
    let mut batches = Vec::new();
    for _ in 0..TICKS {
        for _ in 0..SAMPLES_PER_TICK {
            ctx.record(sensor.read().expect("read"));
        }
        batches.extend(ctx.tick().batch);
    }

    assert_eq!(sensor.bus().data_reads(), (TICKS * SAMPLES_PER_TICK) as u64);
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0].windows(),
        vec![WindowAverage::new(100.0, 200.0, 300.0); TICKS].as_slice()
    );
    let snap = ctx.stats().snapshot();
    assert_eq!(snap.samples, 1_100);
    assert_eq!(snap.windows, 11);
    assert_eq!(snap.batches, 1);
}

#[test]
fn empty_ticks_do_not_advance_the_batch() {
    let ctx = PipelineContext::new(2).expect("context");
    for _ in 0..5 {
        assert!(ctx.tick().window.is_none());
    }
    assert_eq!(ctx.pending_windows(), 0);

    ctx.record(RawSample::new(1.0, 2.0, 3.0));
    ctx.tick();
    assert!(ctx.tick().window.is_none());
    ctx.record(RawSample::new(3.0, 2.0, 1.0));
    let batch = ctx.tick().batch.expect("second real window completes the batch");
    assert_eq!(
        batch.windows(),
        &[
            WindowAverage::new(1.0, 2.0, 3.0),
            WindowAverage::new(3.0, 2.0, 1.0)
        ]
    );
}
