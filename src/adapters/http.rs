//! HTTP adapter for the collection endpoint.
//!
//! Implements [`ReportPort`] with a single POST per payload. No retries;
//! the whole request (connect, send, body read) is bounded by the
//! configured timeout.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::app::ports::{EndpointResponse, ReportPort};
use crate::config::Config;
use crate::error::ReportError;

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Posts report payloads to one fixed URL.
#[derive(Clone)]
pub struct HttpReporter {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpReporter {
    pub fn new(config: &Config) -> Result<Self, ReportError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("pmreporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl ReportPort for HttpReporter {
    async fn send(&self, payload: String) -> Result<EndpointResponse, ReportError> {
        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        Ok(EndpointResponse { status, body })
    }
}
