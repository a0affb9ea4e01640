//! Driving port for reading the notification feed.

use async_trait::async_trait;

use crate::domain::{Error, NotificationFeed, NotificationListQuery};

/// Notification read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQuery: Send + Sync {
    /// Newest-first page plus the unread total, consistent with each other.
    async fn list_with_unread_count(
        &self,
        query: NotificationListQuery,
    ) -> Result<NotificationFeed, Error>;
}

/// Empty feed used when no store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationQuery;

#[async_trait]
impl NotificationQuery for FixtureNotificationQuery {
    async fn list_with_unread_count(
        &self,
        _query: NotificationListQuery,
    ) -> Result<NotificationFeed, Error> {
        Ok(NotificationFeed::default())
    }
}
