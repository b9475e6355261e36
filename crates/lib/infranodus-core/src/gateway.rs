//! Outbound gateway to the InfraNodus REST API.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{NodusError, NodusResult};
use crate::model::{ApiPayload, GraphResponse};
use crate::request::GraphQueryRequest;

/// Issues a single request and returns the normalized response.
///
/// Implementations must not retry; one invocation maps to at most one remote call.
#[async_trait]
pub trait GraphGateway: Send + Sync {
    async fn send(&self, request: &GraphQueryRequest) -> NodusResult<GraphResponse>;
}

/// `reqwest`-backed gateway bound to one [`ApiConfig`].
#[derive(Debug, Clone)]
pub struct InfraNodusClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl InfraNodusClient {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    /// Returns `NodusError::Config` if the HTTP client cannot be constructed.
    pub fn new(config: ApiConfig) -> NodusResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| NodusError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait]
impl GraphGateway for InfraNodusClient {
    async fn send(&self, request: &GraphQueryRequest) -> NodusResult<GraphResponse> {
        let url = request.url(&self.config.api_base)?;
        debug!(endpoint = %request.endpoint, "sending InfraNodus request");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&request.body)
            .send()
            .await?;

        let status = response.status();
        debug!(endpoint = %request.endpoint, status = status.as_u16(), "InfraNodus responded");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NodusError::RemoteApi {
                status: Some(status.as_u16()),
                body,
            });
        }

        let value: Value = response.json().await.map_err(|err| {
            if err.is_decode() {
                NodusError::Decode(err.to_string())
            } else {
                NodusError::from(err)
            }
        })?;
        Ok(ApiPayload::from_value(value)?.into_response())
    }
}
