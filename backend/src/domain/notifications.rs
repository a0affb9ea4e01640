//! Notification feed entities.
//!
//! Notifications are created by domain events and only ever change through an
//! explicit read-flag transition. They are never deleted.

use chrono::{DateTime, Utc};

/// Default page size for the notification feed.
pub const DEFAULT_FEED_LIMIT: u32 = 10;
/// Largest page the feed will return.
pub const MAX_FEED_LIMIT: u32 = 100;

/// Validation failures for notification inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationValidationError {
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Offending field name as exposed to clients.
        field: &'static str,
    },
    /// Identifiers are positive database keys.
    #[error("notification id must be positive, got {0}")]
    NonPositiveId(i32),
    /// Related-entity references need both halves.
    #[error("relatedId and relatedType must be supplied together")]
    PartialRelation,
    /// Feed limit outside `1..=MAX_FEED_LIMIT`.
    #[error("limit must be between 1 and {max}, got {value}")]
    LimitOutOfRange {
        /// Requested value.
        value: u32,
        /// Upper bound.
        max: u32,
    },
}

/// Notification primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(i32);

impl NotificationId {
    /// Validate a raw identifier.
    pub fn new(raw: i32) -> Result<Self, NotificationValidationError> {
        if raw <= 0 {
            return Err(NotificationValidationError::NonPositiveId(raw));
        }
        Ok(Self(raw))
    }

    /// Raw database key.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity a notification points at, e.g. a parcel that changed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedEntity {
    /// Identifier of the related record.
    pub id: i32,
    /// Kind tag such as `parcel` or `task`.
    pub kind: String,
}

/// Stored notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Primary key.
    pub id: NotificationId,
    /// Free-form type tag, e.g. `TASK_DUE`.
    pub kind: String,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Optional link to a related record.
    pub related: Option<RelatedEntity>,
    /// Read flag.
    pub is_read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    kind: String,
    title: String,
    message: String,
    related: Option<RelatedEntity>,
}

/// Raw creation payload prior to validation.
#[derive(Debug, Clone, Default)]
pub struct NewNotificationDraft {
    /// Type tag.
    pub kind: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Related record id.
    pub related_id: Option<i32>,
    /// Related record kind.
    pub related_type: Option<String>,
}

fn required(field: &'static str, value: &str) -> Result<String, NotificationValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NotificationValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

impl TryFrom<NewNotificationDraft> for NewNotification {
    type Error = NotificationValidationError;

    fn try_from(draft: NewNotificationDraft) -> Result<Self, Self::Error> {
        let kind = required("type", &draft.kind)?;
        let title = required("title", &draft.title)?;
        let message = required("message", &draft.message)?;
        let related_kind = draft
            .related_type
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let related = match (draft.related_id, related_kind) {
            (Some(id), Some(kind)) => Some(RelatedEntity { id, kind }),
            (None, None) => None,
            _ => return Err(NotificationValidationError::PartialRelation),
        };
        Ok(Self {
            kind,
            title,
            message,
            related,
        })
    }
}

impl NewNotification {
    /// Type tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Headline.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Related record, if any.
    #[must_use]
    pub fn related(&self) -> Option<&RelatedEntity> {
        self.related.as_ref()
    }
}

/// Feed query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationListQuery {
    limit: u32,
    unread_only: bool,
}

impl Default for NotificationListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FEED_LIMIT,
            unread_only: false,
        }
    }
}

impl NotificationListQuery {
    /// Build a query, applying the default limit when none is given.
    pub fn new(limit: Option<u32>, unread_only: bool) -> Result<Self, NotificationValidationError> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT);
        if limit == 0 || limit > MAX_FEED_LIMIT {
            return Err(NotificationValidationError::LimitOutOfRange {
                value: limit,
                max: MAX_FEED_LIMIT,
            });
        }
        Ok(Self { limit, unread_only })
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Whether read notifications are excluded from the list.
    #[must_use]
    pub const fn unread_only(&self) -> bool {
        self.unread_only
    }
}

/// Notifications plus the unread total, read from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationFeed {
    /// Newest first, at most `limit` entries.
    pub notifications: Vec<Notification>,
    /// Count of all unread notifications at snapshot time.
    pub unread_count: u64,
}
