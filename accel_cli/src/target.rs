//! Classifier reached over HTTP: POST the batch as JSON, decode the scores.

use accel_core::{ClassifyRequest, ClassifyResponse, DispatchTarget};
use accel_traits::BoxError;
use eyre::WrapErr;
use reqwest::blocking::Client;
use std::time::Duration;

pub struct HttpTarget {
    client: Client,
    url: String,
}

impl HttpTarget {
    pub fn new(url: impl Into<String>, timeout: Duration) -> eyre::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("build HTTP client for the classifier")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl DispatchTarget for HttpTarget {
    fn classify(&mut self, request: &ClassifyRequest) -> Result<ClassifyResponse, BoxError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()?
            .error_for_status()?;
        Ok(response.json::<ClassifyResponse>()?)
    }
}
