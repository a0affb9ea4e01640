//! PostgreSQL-backed [`NotificationRepository`] adapter.
//!
//! The feed and its unread count are read inside one `REPEATABLE READ, READ
//! ONLY` transaction so both observe the same snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{
    NewNotification, Notification, NotificationFeed, NotificationId, NotificationListQuery,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{collect_rows, notification_from_row};
use super::schema::notifications;

/// Diesel-backed notification feed.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> NotificationRepositoryError {
    map_pool_error(error, NotificationRepositoryError::connection)
}

fn diesel_error(
    error: diesel::result::Error,
    operation: &'static str,
) -> NotificationRepositoryError {
    map_basic_diesel_error(
        error,
        operation,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(
        &self,
        notification: &NewNotification,
        created_at: DateTime<Utc>,
    ) -> Result<Notification, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let related = notification.related();
        let row = NewNotificationRow {
            kind: notification.kind(),
            title: notification.title(),
            message: notification.message(),
            related_id: related.map(|entity| entity.id),
            related_type: related.map(|entity| entity.kind.as_str()),
            is_read: false,
            created_at,
        };
        let stored = diesel::insert_into(notifications::table)
            .values(&row)
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "insert notification"))?;
        notification_from_row(stored).map_err(NotificationRepositoryError::query)
    }

    async fn set_read(
        &self,
        id: NotificationId,
        is_read: bool,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(notifications::table.find(id.get()))
            .set(notifications::is_read.eq(is_read))
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| diesel_error(err, "mark notification read"))?;
        updated
            .map(notification_from_row)
            .transpose()
            .map_err(NotificationRepositoryError::query)
    }

    async fn mark_all_read(&self) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changed = diesel::update(notifications::table.filter(notifications::is_read.eq(false)))
            .set(notifications::is_read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "mark all notifications read"))?;
        Ok(u64::try_from(changed).unwrap_or(u64::MAX))
    }

    async fn list_with_unread_count(
        &self,
        query: &NotificationListQuery,
    ) -> Result<NotificationFeed, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let limit = i64::from(query.limit());
        let unread_only = query.unread_only();

        let (rows, unread) = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let mut listing = notifications::table
                        .select(NotificationRow::as_select())
                        .order_by((notifications::created_at.desc(), notifications::id.desc()))
                        .limit(limit)
                        .into_boxed();
                    if unread_only {
                        listing = listing.filter(notifications::is_read.eq(false));
                    }
                    let rows: Vec<NotificationRow> = listing.load(conn).await?;
                    let unread: i64 = notifications::table
                        .filter(notifications::is_read.eq(false))
                        .count()
                        .get_result(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((rows, unread))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| diesel_error(err, "list notifications"))?;

        Ok(NotificationFeed {
            notifications: collect_rows(
                rows.into_iter().map(notification_from_row),
                NotificationRepositoryError::query,
            )?,
            unread_count: u64::try_from(unread).unwrap_or_default(),
        })
    }
}
