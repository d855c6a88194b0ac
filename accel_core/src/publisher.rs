//! Outbound stream of classification results over a persistent connection.
//!
//! Delivery is at-most-once: a failed send drops that message and marks the
//! connection broken; the next publish makes a single reconnect attempt.
use accel_traits::{BoxError, Clock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{PipelineError, PublishError};
use crate::types::StreamMessage;

pub trait Connection {
    fn send_text(&mut self, text: &str) -> Result<(), BoxError>;
}

pub trait Connector {
    type Conn: Connection;
    fn connect(&mut self, url: &str) -> Result<Self::Conn, BoxError>;
}

pub struct StreamPublisher<K: Connector, C> {
    connector: K,
    clock: C,
    url: String,
    backoff: Duration,
    conn: Option<K::Conn>,
}

impl<K: Connector, C: Clock> StreamPublisher<K, C> {
    pub fn new(connector: K, clock: C, url: impl Into<String>, backoff: Duration) -> Self {
        Self {
            connector,
            clock,
            url: url.into(),
            backoff,
            conn: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect, retrying after a fixed backoff until it succeeds or `stop` is set.
    /// Returns the number of attempts it took.
    pub fn connect(&mut self, stop: &AtomicBool) -> Result<u32, PipelineError> {
        let mut attempt: u32 = 0;
        loop {
            if stop.load(Ordering::Relaxed) {
                return Err(PipelineError::Stopped);
            }
            attempt = attempt.saturating_add(1);
            match self.connector.connect(&self.url) {
                Ok(conn) => {
                    info!(url = %self.url, attempt, "stream connected");
                    self.conn = Some(conn);
                    return Ok(attempt);
                }
                Err(e) => {
                    warn!(
                        url = %self.url,
                        attempt,
                        backoff_ms = self.backoff.as_millis() as u64,
                        error = %e,
                        "stream connect failed, retrying"
                    );
                    self.clock.sleep(self.backoff);
                }
            }
        }
    }

    pub fn publish(&mut self, msg: &StreamMessage) -> Result<(), PublishError> {
        let text =
            serde_json::to_string(msg).map_err(|e| PublishError::Serialize(e.to_string()))?;

        if self.conn.is_none() {
            let conn = self
                .connector
                .connect(&self.url)
                .map_err(|e| PublishError::NotConnected(e.to_string()))?;
            info!(url = %self.url, "stream reconnected");
            self.conn = Some(conn);
        }
        let Some(conn) = self.conn.as_mut() else {
            return Err(PublishError::NotConnected("no connection".into()));
        };

        if let Err(e) = conn.send_text(&text) {
            self.conn = None;
            return Err(PublishError::Send(e.to_string()));
        }
        Ok(())
    }
}
