use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::metrics::{Endpoint, RequestMetrics};
use super::types::{StatsError, StatsResponse};

const USER_AGENT: &str = concat!("dotawatch/", env!("CARGO_PKG_VERSION"));

/// Thin HTTP client for the OpenDota REST API. Endpoint wrappers live in
/// [`super::endpoints`].
#[derive(Debug, Clone)]
pub struct OpenDotaClient {
    client: reqwest::Client,
    base_url: String,
    metrics: Arc<RequestMetrics>,
}

impl OpenDotaClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        metrics: Arc<RequestMetrics>,
    ) -> StatsResponse<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            metrics,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metrics(&self) -> &Arc<RequestMetrics> {
        &self.metrics
    }

    /// GET `url` and decode the JSON body. Any non-200 answer is an error.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: &str,
    ) -> StatsResponse<T> {
        tracing::trace!(url, endpoint = endpoint.label(), "[OPENDOTA] GET");
        self.metrics.inc(endpoint);

        let res = self.client.get(url).send().await?;

        match res.status() {
            StatusCode::OK => {
                let body = res.bytes().await?;
                Ok(serde_json::from_slice(&body)?)
            }
            status => Err(StatsError::Status(status)),
        }
    }
}
