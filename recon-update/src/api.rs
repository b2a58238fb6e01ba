//! Record API clients
//!
//! [`RecordApi`] is the seam to the remote system. The simulated client is
//! deterministic so runs can be replayed; the HTTP client posts to a real
//! endpoint.

use crate::session::Session;
use async_trait::async_trait;
use recon_common::executor::ActionError;
use recon_common::mapping::normalize_key;
use recon_common::{Error, Result};
use std::collections::HashSet;
use std::time::Duration;

/// Record type sent with every update
pub const RECORD_TYPE: &str = "GenericRecordType";

/// One record update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub record_id: String,
    /// (API field name, value) in column order
    pub fields: Vec<(String, String)>,
}

impl UpdateRequest {
    /// Query parameters for the update call
    pub fn query_params(&self, session: &Session) -> Vec<(String, String)> {
        let mut params = vec![
            ("sessionId".to_string(), session.id.clone()),
            ("record_type".to_string(), RECORD_TYPE.to_string()),
            ("id".to_string(), self.record_id.clone()),
            ("useIds".to_string(), "false".to_string()),
        ];
        params.extend(self.fields.iter().cloned());
        params
    }
}

/// Response from the record API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Remote record API
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Send one update; transport failures are `ActionError::Fault`
    async fn update(&self, session: &Session, request: &UpdateRequest) -> std::result::Result<ApiResponse, ActionError>;
}

/// Deterministic stand-in: `200` unless the record id is on the reject list
#[derive(Debug, Default)]
pub struct SimulatedRecordApi {
    reject: HashSet<String>,
}

impl SimulatedRecordApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `500` for these record ids (compared case-insensitively)
    pub fn with_rejects<S: AsRef<str>>(mut self, ids: &[S]) -> Self {
        self.reject.extend(ids.iter().map(|id| normalize_key(id.as_ref())));
        self
    }
}

#[async_trait]
impl RecordApi for SimulatedRecordApi {
    async fn update(&self, _session: &Session, request: &UpdateRequest) -> std::result::Result<ApiResponse, ActionError> {
        tracing::debug!(
            record_id = %request.record_id,
            fields = request.fields.len(),
            "Simulating update"
        );

        if self.reject.contains(&normalize_key(&request.record_id)) {
            return Ok(ApiResponse {
                status: 500,
                body: "Simulated: Internal server error during update.".to_string(),
            });
        }

        Ok(ApiResponse {
            status: 200,
            body: "Simulated: Record updated successfully.".to_string(),
        })
    }
}

/// HTTP client posting to `<endpoint>/records/update`
pub struct HttpRecordApi {
    http_client: reqwest::Client,
    update_url: String,
}

impl HttpRecordApi {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("recon-update/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            update_url: format!("{}/records/update", endpoint.trim_end_matches('/')),
        })
    }

    pub fn update_url(&self) -> &str {
        &self.update_url
    }
}

#[async_trait]
impl RecordApi for HttpRecordApi {
    async fn update(&self, session: &Session, request: &UpdateRequest) -> std::result::Result<ApiResponse, ActionError> {
        tracing::debug!(record_id = %request.record_id, url = %self.update_url, "Posting update");

        let response = self
            .http_client
            .post(&self.update_url)
            .query(&request.query_params(session))
            .send()
            .await
            .map_err(|e| ActionError::Fault(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            ActionError::Fault(format!("HTTP {}: failed to read response body: {}", status, e))
        })?;

        Ok(ApiResponse { status, body })
    }
}
