use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::FetchError;

use super::ObservationSource;

/// Fetches the OpenWeatherMap current-weather document over HTTPS.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    http: Client,
}

impl OpenWeatherSource {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// A source whose requests give up after `timeout`, connect included.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self { http })
    }
}

impl Default for OpenWeatherSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObservationSource for OpenWeatherSource {
    async fn fetch(&self, url: &Url) -> Result<Value, FetchError> {
        info!(host = url.host_str().unwrap_or_default(), path = url.path(), "fetching current weather");

        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Body(e.without_url()))?;

        debug!(%status, bytes = body.len(), "received response");

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
