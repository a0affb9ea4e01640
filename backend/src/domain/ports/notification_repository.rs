//! Port for notification persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    NewNotification, Notification, NotificationFeed, NotificationId, NotificationListQuery,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => service_unavailable,
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => internal,
            "notification repository query failed: {message}",
    }
}

/// Storage for the notification feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store a new unread notification.
    async fn insert(
        &self,
        notification: &NewNotification,
        created_at: DateTime<Utc>,
    ) -> Result<Notification, NotificationRepositoryError>;

    /// Set the read flag of one notification; `None` when it does not exist.
    async fn set_read(
        &self,
        id: NotificationId,
        is_read: bool,
    ) -> Result<Option<Notification>, NotificationRepositoryError>;

    /// Mark every unread notification as read in one statement, returning
    /// how many rows changed.
    async fn mark_all_read(&self) -> Result<u64, NotificationRepositoryError>;

    /// Read a page of notifications and the unread total from one snapshot.
    async fn list_with_unread_count(
        &self,
        query: &NotificationListQuery,
    ) -> Result<NotificationFeed, NotificationRepositoryError>;
}
