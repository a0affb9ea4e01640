//! Driving ports for reading and writing the audit trail.
//!
//! Authorisation is not checked here; callers run the admin gate first.

use async_trait::async_trait;

use crate::domain::{AuditLogEntry, AuditLogFilter, Error, NewAuditLogEntry};

/// Audit trail read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogQuery: Send + Sync {
    /// Entries matching the filter, newest first.
    async fn query_audit_logs(&self, filter: AuditLogFilter) -> Result<Vec<AuditLogEntry>, Error>;

    /// Security-relevant entries only. `None` applies the security default
    /// limit.
    async fn query_security_logs(&self, limit: Option<u32>) -> Result<Vec<AuditLogEntry>, Error>;
}

/// Fire-and-forget audit writer.
///
/// Recording never fails the surrounding operation; implementations log and
/// swallow storage errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    /// Append an entry.
    async fn record(&self, entry: NewAuditLogEntry);
}

/// Recorder that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuditRecorder;

#[async_trait]
impl AuditRecorder for NoOpAuditRecorder {
    async fn record(&self, _entry: NewAuditLogEntry) {}
}
