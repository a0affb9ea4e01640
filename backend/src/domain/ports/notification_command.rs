//! Driving port for notification read-state transitions and creation.

use async_trait::async_trait;

use crate::domain::{Error, NewNotification, Notification, NotificationId};

/// Notification write use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Record a new unread notification.
    async fn create(&self, notification: NewNotification) -> Result<Notification, Error>;

    /// Set one notification's read flag. Idempotent; `NotFound` for an
    /// unknown id.
    async fn mark_read(&self, id: NotificationId, is_read: bool) -> Result<Notification, Error>;

    /// Mark every unread notification read, returning how many changed.
    async fn mark_all_read(&self) -> Result<u64, Error>;
}
