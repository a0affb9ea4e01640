//! Port for the internal analysis service sitting behind the proxy.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ANALYSIS_UNREACHABLE_MESSAGE, AnalysisPath, Error};

/// Failures reported by analysis backend adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisBackendError {
    /// No HTTP response was received: refused, reset, DNS, or timeout.
    #[error("analysis backend unreachable: {message}")]
    Unreachable {
        /// Transport error description.
        message: String,
    },
    /// The backend answered with a non-success status.
    #[error("analysis backend returned {status}: {reason}")]
    Status {
        /// Upstream HTTP status.
        status: u16,
        /// Reason phrase or body excerpt.
        reason: String,
    },
    /// A success response carried a body that is not JSON.
    ///
    /// Reported to callers like an unreachable backend.
    #[error("analysis backend returned an unreadable body: {message}")]
    Decode {
        /// Parser error description.
        message: String,
    },
}

impl From<AnalysisBackendError> for Error {
    fn from(err: AnalysisBackendError) -> Self {
        match err {
            AnalysisBackendError::Unreachable { .. } | AnalysisBackendError::Decode { .. } => {
                Error::service_unavailable(ANALYSIS_UNREACHABLE_MESSAGE)
            }
            AnalysisBackendError::Status { status, reason } => {
                Error::upstream_failure(status, format!("Backend failed: {reason}"))
            }
        }
    }
}

/// Forwarding client for the analysis service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// POST `body` to `path` and return the decoded JSON response.
    async fn forward(&self, path: &AnalysisPath, body: Value) -> Result<Value, AnalysisBackendError>;
}

/// Driving port used by the proxy handler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisProxy: Send + Sync {
    /// Forward an authenticated caller's request body.
    async fn forward(&self, path: AnalysisPath, body: Value) -> Result<Value, Error>;
}
