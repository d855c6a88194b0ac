//! Classification hand-off: batch in, per-class scores out.
//!
//! The classifier itself sits behind `DispatchTarget`; this module only shapes
//! the request and validates the response.
use accel_traits::BoxError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DispatchError;
use crate::types::{Batch, ClassLabel, ClassificationResult};

/// Request payload: the batch's windows, in order, under `accelerometer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub accelerometer: Vec<[f64; 3]>,
}

impl From<&Batch> for ClassifyRequest {
    fn from(batch: &Batch) -> Self {
        Self {
            accelerometer: batch.windows().iter().map(|w| w.to_array()).collect(),
        }
    }
}

/// Parallel label/score sequences returned by the classifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub classes: Vec<String>,
    pub scores: Vec<f64>,
}

pub trait DispatchTarget {
    fn classify(&mut self, request: &ClassifyRequest) -> Result<ClassifyResponse, BoxError>;
}

impl<T: DispatchTarget + ?Sized> DispatchTarget for Box<T> {
    fn classify(&mut self, request: &ClassifyRequest) -> Result<ClassifyResponse, BoxError> {
        (**self).classify(request)
    }
}

pub struct DispatchClient<T> {
    target: T,
}

impl<T: DispatchTarget> DispatchClient<T> {
    pub fn new(target: T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Submit one batch and block until the classifier answers.
    pub fn dispatch(&mut self, batch: &Batch) -> Result<ClassificationResult, DispatchError> {
        let request = ClassifyRequest::from(batch);
        let response = self
            .target
            .classify(&request)
            .map_err(|e| DispatchError::Target(e.to_string()))?;
        debug!(
            windows = batch.len(),
            labels = response.classes.len(),
            "classification received"
        );
        interpret(&response)
    }
}

/// Zip labels with scores by exact label match; unknown labels are ignored.
pub fn interpret(response: &ClassifyResponse) -> Result<ClassificationResult, DispatchError> {
    if response.classes.len() != response.scores.len() {
        return Err(DispatchError::MalformedResponse(format!(
            "{} classes but {} scores",
            response.classes.len(),
            response.scores.len()
        )));
    }
    let mut result = ClassificationResult::default();
    for (label, score) in response.classes.iter().zip(&response.scores) {
        if !score.is_finite() {
            return Err(DispatchError::MalformedResponse(format!(
                "non-finite score for {label}"
            )));
        }
        if let Some(known) = ClassLabel::from_response(label) {
            result.set(known, *score);
        }
    }
    Ok(result)
}
