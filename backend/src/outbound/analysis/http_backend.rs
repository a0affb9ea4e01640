//! Reqwest-backed analysis backend adapter.
//!
//! Owns transport details only: URL joining, the request timeout, status
//! mapping, and JSON decoding. Request bodies are forwarded untouched.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::AnalysisPath;
use crate::domain::ports::{AnalysisBackend, AnalysisBackendError};

/// Default per-request timeout.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);

/// Failures while constructing the adapter.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisClientError {
    /// The reqwest client could not be built.
    #[error("failed to build analysis client: {0}")]
    Client(#[from] reqwest::Error),
    /// The base URL cannot carry path segments.
    #[error("analysis backend URL '{0}' cannot be used as a base")]
    InvalidBase(String),
}

/// Forwards proxy requests to one analysis backend origin.
pub struct AnalysisHttpBackend {
    client: Client,
    base: Url,
}

impl AnalysisHttpBackend {
    /// Build an adapter with an explicit request timeout.
    ///
    /// ```rust,ignore
    /// let base = Url::parse("http://127.0.0.1:8000")?;
    /// let backend = AnalysisHttpBackend::new(base, DEFAULT_ANALYSIS_TIMEOUT)?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisClientError`] when the client cannot be built or the
    /// base URL is not hierarchical.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, AnalysisClientError> {
        if base.cannot_be_a_base() {
            return Err(AnalysisClientError::InvalidBase(base.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Absolute URL for `path`, one percent-encoded segment at a time.
    fn endpoint(&self, path: &AnalysisPath) -> Result<Url, AnalysisBackendError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| AnalysisBackendError::Unreachable {
                message: format!("analysis backend URL '{}' cannot be a base", self.base),
            })?
            .pop_if_empty()
            .extend(path.as_str().split('/'));
        Ok(url)
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisHttpBackend {
    async fn forward(&self, path: &AnalysisPath, body: Value) -> Result<Value, AnalysisBackendError> {
        let url = self.endpoint(path)?;
        debug!(%url, "forwarding analysis request");

        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        serde_json::from_slice(bytes.as_ref()).map_err(|error| AnalysisBackendError::Decode {
            message: error.to_string(),
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> AnalysisBackendError {
    AnalysisBackendError::Unreachable {
        message: error.to_string(),
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AnalysisBackendError {
    warn!(
        status = status.as_u16(),
        body = %body_preview(body),
        "analysis backend rejected request"
    );
    AnalysisBackendError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_owned(),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
