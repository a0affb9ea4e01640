//! Analysis proxy service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::domain::ports::{AnalysisBackend, AnalysisBackendError, AnalysisProxy};
use crate::domain::{AnalysisPath, Error};

/// Forwards analysis requests to the configured backend without retries.
#[derive(Clone)]
pub struct AnalysisProxyService<B> {
    backend: Arc<B>,
}

impl<B> AnalysisProxyService<B> {
    /// Create a proxy over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B> AnalysisProxy for AnalysisProxyService<B>
where
    B: AnalysisBackend,
{
    async fn forward(&self, path: AnalysisPath, body: Value) -> Result<Value, Error> {
        self.backend.forward(&path, body).await.map_err(|err| {
            match &err {
                AnalysisBackendError::Status { status, .. } => {
                    warn!(path = %path, status, error = %err, "analysis backend rejected request");
                }
                AnalysisBackendError::Unreachable { .. } | AnalysisBackendError::Decode { .. } => {
                    warn!(path = %path, error = %err, "analysis backend unavailable");
                }
            }
            Error::from(err)
        })
    }
}
