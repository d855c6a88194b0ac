//! Test and helper mocks for accel_core: a scripted sensor, classifier and stream endpoint.

use accel_traits::{Accelerometer, BoxError, RawSample};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::dispatch::{ClassifyRequest, ClassifyResponse, DispatchTarget};
use crate::publisher::{Connection, Connector};

/// Build a classifier response from label/score pairs.
pub fn response(pairs: &[(&str, f64)]) -> ClassifyResponse {
    ClassifyResponse {
        classes: pairs.iter().map(|(l, _)| (*l).to_string()).collect(),
        scores: pairs.iter().map(|(_, s)| *s).collect(),
    }
}

/// Cycles through a fixed list of samples, optionally failing every n-th read.
pub struct ScriptedSensor {
    samples: Vec<RawSample>,
    next: usize,
    reads: Arc<AtomicU64>,
    fail_every: Option<u64>,
}

impl ScriptedSensor {
    pub fn constant(sample: RawSample) -> Self {
        Self::cycle(vec![sample])
    }

    pub fn cycle(samples: Vec<RawSample>) -> Self {
        let samples = if samples.is_empty() {
            vec![RawSample::default()]
        } else {
            samples
        };
        Self {
            samples,
            next: 0,
            reads: Arc::new(AtomicU64::new(0)),
            fail_every: None,
        }
    }

    pub fn failing_every(mut self, n: u64) -> Self {
        self.fail_every = Some(n.max(1));
        self
    }

    /// Shared count of `read()` calls, including failed ones.
    pub fn read_counter(&self) -> Arc<AtomicU64> {
        self.reads.clone()
    }
}

impl Accelerometer for ScriptedSensor {
    fn read(&mut self) -> Result<RawSample, BoxError> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(k) = self.fail_every
            && n % k == 0
        {
            return Err("scripted read failure".into());
        }
        let s = self.samples[self.next % self.samples.len()];
        self.next = self.next.wrapping_add(1);
        Ok(s)
    }
}

/// Replays queued outcomes, then repeats the fallback forever.
pub struct ScriptedTarget {
    queued: VecDeque<Result<ClassifyResponse, String>>,
    fallback: Result<ClassifyResponse, String>,
    requests: Arc<Mutex<Vec<ClassifyRequest>>>,
}

impl ScriptedTarget {
    pub fn new(fallback: Result<ClassifyResponse, String>) -> Self {
        Self {
            queued: VecDeque::new(),
            fallback,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn then(mut self, outcome: Result<ClassifyResponse, String>) -> Self {
        self.queued.push_back(outcome);
        self
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<ClassifyRequest>>> {
        self.requests.clone()
    }
}

impl DispatchTarget for ScriptedTarget {
    fn classify(&mut self, request: &ClassifyRequest) -> Result<ClassifyResponse, BoxError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        let outcome = self
            .queued
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        outcome.map_err(BoxError::from)
    }
}

type ConnectProbe = Box<dyn FnMut(u32) + Send>;

/// In-memory stream endpoint recording every text frame.
pub struct RecordingConnector {
    fail_connects: u32,
    attempts: Arc<AtomicU32>,
    sent: Arc<Mutex<Vec<String>>>,
    fail_sends: Arc<AtomicU32>,
    probe: Option<ConnectProbe>,
}

impl Default for RecordingConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self {
            fail_connects: 0,
            attempts: Arc::new(AtomicU32::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_sends: Arc::new(AtomicU32::new(0)),
            probe: None,
        }
    }

    /// Refuse the first `n` connection attempts.
    pub fn failing_first(mut self, n: u32) -> Self {
        self.fail_connects = n;
        self
    }

    /// Called with the attempt number before every connection attempt.
    pub fn with_probe(mut self, probe: impl FnMut(u32) + Send + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    pub fn attempts(&self) -> Arc<AtomicU32> {
        self.attempts.clone()
    }

    pub fn sent(&self) -> Arc<Mutex<Vec<String>>> {
        self.sent.clone()
    }

    /// Fail the next `n` sends on any connection made by this connector.
    pub fn fail_sends(&self) -> Arc<AtomicU32> {
        self.fail_sends.clone()
    }
}

impl Connector for RecordingConnector {
    type Conn = RecordingConnection;

    fn connect(&mut self, _url: &str) -> Result<RecordingConnection, BoxError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(probe) = self.probe.as_mut() {
            probe(attempt);
        }
        if attempt <= self.fail_connects {
            return Err(format!("connection refused (attempt {attempt})").into());
        }
        Ok(RecordingConnection {
            sent: self.sent.clone(),
            fail_sends: self.fail_sends.clone(),
        })
    }
}

pub struct RecordingConnection {
    sent: Arc<Mutex<Vec<String>>>,
    fail_sends: Arc<AtomicU32>,
}

impl Connection for RecordingConnection {
    fn send_text(&mut self, text: &str) -> Result<(), BoxError> {
        let fail = self
            .fail_sends
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err("broken pipe".into());
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text.to_string());
        }
        Ok(())
    }
}
