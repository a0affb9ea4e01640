//! Notification feed service.
//!
//! Implements the notification driving ports over a [`NotificationRepository`].
//! Read-state changes are plain last-write-wins updates; the repository owns
//! snapshot consistency for the feed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{NotificationCommand, NotificationQuery, NotificationRepository};
use crate::domain::{
    Error, NewNotification, Notification, NotificationFeed, NotificationId, NotificationListQuery,
};

/// Notification service implementing both command and query ports.
#[derive(Clone)]
pub struct NotificationService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> NotificationService<R> {
    /// Create a service over `repo`, stamping new rows with `clock`.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

#[async_trait]
impl<R> NotificationCommand for NotificationService<R>
where
    R: NotificationRepository,
{
    async fn create(&self, notification: NewNotification) -> Result<Notification, Error> {
        let created = self.repo.insert(&notification, self.clock.utc()).await?;
        info!(notification_id = %created.id, kind = %created.kind, "notification created");
        Ok(created)
    }

    async fn mark_read(&self, id: NotificationId, is_read: bool) -> Result<Notification, Error> {
        self.repo
            .set_read(id, is_read)
            .await?
            .ok_or_else(|| Error::not_found(format!("notification {id} not found")))
    }

    async fn mark_all_read(&self) -> Result<u64, Error> {
        let updated = self.repo.mark_all_read().await?;
        info!(updated, "marked all notifications read");
        Ok(updated)
    }
}

#[async_trait]
impl<R> NotificationQuery for NotificationService<R>
where
    R: NotificationRepository,
{
    async fn list_with_unread_count(
        &self,
        query: NotificationListQuery,
    ) -> Result<NotificationFeed, Error> {
        Ok(self.repo.list_with_unread_count(&query).await?)
    }
}

#[cfg(test)]
#[path = "notification_service_tests.rs"]
mod tests;
