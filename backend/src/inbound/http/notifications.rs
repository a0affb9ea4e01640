//! Notification feed handlers.
//!
//! ```text
//! GET   /api/v1/notifications?limit=10&unreadOnly=true
//! POST  /api/v1/notifications
//! PATCH /api/v1/notifications/mark-all-read
//! PATCH /api/v1/notifications/{id} {"isRead":true}
//! ```
//!
//! Every route requires a session; the feed itself is shared by all users.

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    NewNotification, NewNotificationDraft, Notification, NotificationFeed, NotificationId,
    NotificationListQuery, NotificationValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_id};

/// Feed query string.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NotificationsParams {
    /// Page size, 1 to 100; defaults to 10.
    pub limit: Option<u32>,
    /// Only unread entries.
    pub unread_only: Option<bool>,
}

/// Notification as sent to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    /// Notification identifier.
    pub id: i32,
    /// Category, serialised as `type`.
    #[serde(rename = "type")]
    #[schema(example = "PARCEL_UPDATE")]
    pub kind: String,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Identifier of the related record, if any.
    pub related_id: Option<i32>,
    /// Kind of the related record, such as `parcel`.
    pub related_type: Option<String>,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        let (related_id, related_type) = value
            .related
            .map_or((None, None), |related| (Some(related.id), Some(related.kind)));
        Self {
            id: value.id.get(),
            kind: value.kind,
            title: value.title,
            message: value.message,
            related_id,
            related_type,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}

/// Feed page plus the global unread count.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeedResponse {
    /// Page of notifications, newest first.
    pub notifications: Vec<NotificationResponse>,
    /// Unread notifications across the whole feed.
    pub unread_count: u64,
}

impl From<NotificationFeed> for NotificationFeedResponse {
    fn from(feed: NotificationFeed) -> Self {
        Self {
            notifications: feed.notifications.into_iter().map(Into::into).collect(),
            unread_count: feed.unread_count,
        }
    }
}

/// Body of `POST /notifications`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    /// Category, sent as `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Identifier of the related record.
    #[serde(default)]
    pub related_id: Option<i32>,
    /// Kind of the related record.
    #[serde(default)]
    pub related_type: Option<String>,
}

/// Body of `PATCH /notifications/{id}`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    /// Target read state.
    pub is_read: bool,
}

/// Result of the bulk read transition.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MarkAllReadResponse {
    /// Always `true` on success.
    pub success: bool,
    /// Rows that were unread before the call.
    pub updated: u64,
}

fn map_validation_error(err: NotificationValidationError) -> crate::domain::Error {
    let field = match err {
        NotificationValidationError::EmptyField { field } => field,
        NotificationValidationError::PartialRelation => "relatedId",
        NotificationValidationError::LimitOutOfRange { .. } => "limit",
        NotificationValidationError::NonPositiveId(_) => "id",
    };
    field_error(FieldName::new(field), err)
}

/// Newest notifications and the unread total, read from one snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationsParams),
    responses(
        (status = 200, description = "Feed", body = NotificationFeedResponse),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    params: web::Query<NotificationsParams>,
) -> ApiResult<web::Json<NotificationFeedResponse>> {
    let NotificationsParams { limit, unread_only } = params.into_inner();
    let query = NotificationListQuery::new(limit, unread_only.unwrap_or(false))
        .map_err(map_validation_error)?;
    let feed = state.notifications_query.list_with_unread_count(query).await?;
    Ok(web::Json(feed.into()))
}

/// Create an unread notification.
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Created", body = NotificationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "createNotification"
)]
#[post("/notifications")]
pub async fn create_notification(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<CreateNotificationRequest>,
) -> ApiResult<HttpResponse> {
    let CreateNotificationRequest {
        kind,
        title,
        message,
        related_id,
        related_type,
    } = payload.into_inner();
    let notification = NewNotification::try_from(NewNotificationDraft {
        kind,
        title,
        message,
        related_id,
        related_type,
    })
    .map_err(map_validation_error)?;
    let created = state.notifications.create(notification).await?;
    Ok(HttpResponse::Created().json(NotificationResponse::from(created)))
}

/// Mark every unread notification as read.
#[utoipa::path(
    patch,
    path = "/api/v1/notifications/mark-all-read",
    responses(
        (status = 200, description = "Rows changed", body = MarkAllReadResponse),
        (status = 401, description = "No session", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[patch("/notifications/mark-all-read")]
pub async fn mark_all_read(
    _caller: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MarkAllReadResponse>> {
    let updated = state.notifications.mark_all_read().await?;
    Ok(web::Json(MarkAllReadResponse {
        success: true,
        updated,
    }))
}

/// Set the read flag on one notification. Repeating the call is harmless.
#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{id}",
    params(("id" = i32, Path, description = "Notification id")),
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Updated notification", body = NotificationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 404, description = "Unknown notification", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[patch("/notifications/{id}")]
pub async fn mark_read(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<MarkReadRequest>,
) -> ApiResult<web::Json<NotificationResponse>> {
    let id = parse_id(path.into_inner(), FieldName::new("id"), NotificationId::new)?;
    let updated = state
        .notifications
        .mark_read(id, payload.into_inner().is_read)
        .await?;
    Ok(web::Json(updated.into()))
}
