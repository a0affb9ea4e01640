//! Analysis backend passthrough primitives.
//!
//! The dashboard forwards analysis requests verbatim to an internal service.
//! Only the path is interpreted here: it must stay relative to the backend
//! origin.

use std::fmt;

/// Message returned when the analysis backend cannot be reached.
pub const ANALYSIS_UNREACHABLE_MESSAGE: &str =
    "Analiz servisine erişilemedi. Backend çalışmıyor olabilir.";

/// Reasons a proxy path is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisPathError {
    /// No segments at all.
    #[error("proxy path must not be empty")]
    Empty,
    /// A segment was empty, `.` or `..`.
    #[error("proxy path segment '{0}' is not allowed")]
    InvalidSegment(String),
}

/// Relative path on the analysis backend, e.g. `analyze/parcel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPath(String);

impl AnalysisPath {
    /// Validate a slash-separated path captured from the request URL.
    ///
    /// # Examples
    /// ```
    /// use parcel_backend::domain::AnalysisPath;
    ///
    /// let path = AnalysisPath::parse("/analyze/parcel").expect("valid path");
    /// assert_eq!(path.as_str(), "analyze/parcel");
    /// assert!(AnalysisPath::parse("../admin").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, AnalysisPathError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Err(AnalysisPathError::Empty);
        }
        if let Some(bad) = trimmed
            .split('/')
            .find(|segment| segment.is_empty() || *segment == "." || *segment == "..")
        {
            return Err(AnalysisPathError::InvalidSegment(bad.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Path without leading or trailing slashes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
