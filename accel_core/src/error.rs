use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("stopped before the stream connection was established")]
    Stopped,
    #[error("failed to spawn {0} thread")]
    Spawn(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("dispatch target failed: {0}")]
    Target(String),
    #[error("malformed classification response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PublishError {
    #[error("serialize stream message: {0}")]
    Serialize(String),
    #[error("stream send failed: {0}")]
    Send(String),
    #[error("stream not connected: {0}")]
    NotConnected(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("batch size must be >= 1")]
    ZeroBatchSize,
    #[error("handoff capacity must be >= 1")]
    ZeroHandoffCapacity,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
