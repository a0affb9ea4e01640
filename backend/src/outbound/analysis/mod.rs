//! Analysis service outbound adapters.
//!
//! A thin HTTP implementation of the `AnalysisBackend` port.

mod http_backend;

pub use http_backend::{AnalysisClientError, AnalysisHttpBackend, DEFAULT_ANALYSIS_TIMEOUT};
