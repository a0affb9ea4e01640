//! PostgreSQL-backed [`AuditLogRepository`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AuditLogRepository, AuditLogRepositoryError};
use crate::domain::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error};
use super::models::{AuditActorRow, AuditLogRow, NewAuditLogRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{audit_entry_from_rows, collect_rows};
use super::schema::{audit_logs, users};

/// Diesel-backed audit trail.
#[derive(Clone)]
pub struct DieselAuditLogRepository {
    pool: DbPool,
}

impl DieselAuditLogRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> AuditLogRepositoryError {
    map_pool_error(error, AuditLogRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error, operation: &'static str) -> AuditLogRepositoryError {
    map_basic_diesel_error(
        error,
        operation,
        AuditLogRepositoryError::query,
        AuditLogRepositoryError::connection,
    )
}

#[async_trait]
impl AuditLogRepository for DieselAuditLogRepository {
    async fn append(
        &self,
        entry: &NewAuditLogEntry,
        created_at: DateTime<Utc>,
    ) -> Result<(), AuditLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewAuditLogRow {
            user_id: entry.user_id.map(|id| id.get()),
            action: entry.action.as_str(),
            resource: entry.resource.as_str(),
            resource_id: entry.resource_id.as_deref(),
            details: entry.details.as_ref(),
            ip_address: entry.metadata.ip_address.as_deref(),
            user_agent: entry.metadata.user_agent.as_deref(),
            status: entry.status.as_str(),
            created_at,
        };
        diesel::insert_into(audit_logs::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "append audit log"))?;
        Ok(())
    }

    async fn query(
        &self,
        filter: &AuditLogFilter,
    ) -> Result<Vec<AuditLogEntry>, AuditLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let mut statement = audit_logs::table
            .left_join(users::table)
            .select((AuditLogRow::as_select(), Option::<AuditActorRow>::as_select()))
            .order_by((audit_logs::created_at.desc(), audit_logs::id.desc()))
            .limit(i64::from(filter.limit.get()))
            .into_boxed();

        if let Some(user_id) = filter.user_id {
            statement = statement.filter(audit_logs::user_id.eq(user_id.get()));
        }
        if !filter.actions.is_empty() {
            let actions: Vec<&'static str> =
                filter.actions.iter().map(|action| action.as_str()).collect();
            statement = statement.filter(audit_logs::action.eq_any(actions));
        }
        if let Some(resource) = &filter.resource {
            statement = statement.filter(audit_logs::resource.eq(resource.as_str().to_owned()));
        }
        if let Some(start) = filter.start {
            statement = statement.filter(audit_logs::created_at.ge(start));
        }
        if let Some(end) = filter.end {
            statement = statement.filter(audit_logs::created_at.le(end));
        }

        let rows: Vec<(AuditLogRow, Option<AuditActorRow>)> = statement
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "query audit logs"))?;
        collect_rows(
            rows.into_iter().map(audit_entry_from_rows),
            AuditLogRepositoryError::query,
        )
    }
}
