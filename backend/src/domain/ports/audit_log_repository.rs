//! Port for the append-only audit trail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry};

use super::define_port_error;

define_port_error! {
    /// Errors raised by audit log adapters.
    pub enum AuditLogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => service_unavailable,
            "audit log connection failed: {message}",
        /// Query or insert failed during execution.
        Query { message: String } => internal,
            "audit log query failed: {message}",
    }
}

/// Audit trail storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append one entry.
    async fn append(
        &self,
        entry: &NewAuditLogEntry,
        created_at: DateTime<Utc>,
    ) -> Result<(), AuditLogRepositoryError>;

    /// Entries matching `filter`, newest first, at most `filter.limit`.
    async fn query(
        &self,
        filter: &AuditLogFilter,
    ) -> Result<Vec<AuditLogEntry>, AuditLogRepositoryError>;
}

/// Repository that stores nothing and finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuditLogRepository;

#[async_trait]
impl AuditLogRepository for FixtureAuditLogRepository {
    async fn append(
        &self,
        _entry: &NewAuditLogEntry,
        _created_at: DateTime<Utc>,
    ) -> Result<(), AuditLogRepositoryError> {
        Ok(())
    }

    async fn query(
        &self,
        _filter: &AuditLogFilter,
    ) -> Result<Vec<AuditLogEntry>, AuditLogRepositoryError> {
        Ok(Vec::new())
    }
}
