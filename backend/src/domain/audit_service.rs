//! Audit trail service.
//!
//! Reads are filtered projections over the repository. Writes are best
//! effort: a failed append is logged and dropped so the audited operation
//! still completes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::error;

use crate::domain::ports::{AuditLogQuery, AuditLogRepository, AuditRecorder};
use crate::domain::{
    AuditLimit, AuditLogEntry, AuditLogFilter, DEFAULT_SECURITY_LIMIT, Error, NewAuditLogEntry,
};

/// Audit service implementing the query and recorder ports.
#[derive(Clone)]
pub struct AuditService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> AuditService<R> {
    /// Create a service over `repo`.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

#[async_trait]
impl<R> AuditLogQuery for AuditService<R>
where
    R: AuditLogRepository,
{
    async fn query_audit_logs(&self, filter: AuditLogFilter) -> Result<Vec<AuditLogEntry>, Error> {
        filter
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(self.repo.query(&filter).await?)
    }

    async fn query_security_logs(&self, limit: Option<u32>) -> Result<Vec<AuditLogEntry>, Error> {
        let filter = AuditLogFilter::security(AuditLimit::clamped(limit, DEFAULT_SECURITY_LIMIT));
        Ok(self.repo.query(&filter).await?)
    }
}

#[async_trait]
impl<R> AuditRecorder for AuditService<R>
where
    R: AuditLogRepository,
{
    async fn record(&self, entry: NewAuditLogEntry) {
        if let Err(err) = self.repo.append(&entry, self.clock.utc()).await {
            error!(
                error = %err,
                action = %entry.action,
                resource = %entry.resource.as_str(),
                "failed to record audit entry"
            );
        }
    }
}
