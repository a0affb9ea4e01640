//! Administrator-only handlers: the audit trail and account management.
//!
//! ```text
//! GET  /api/v1/admin/audit-logs?type=security&limit=10
//! GET  /api/v1/admin/audit-logs?userId=3&action=LOGIN,LOGOUT&startDate=2024-05-01
//! GET  /api/v1/admin/users
//! POST /api/v1/admin/users {"email":"ada@example.com","name":"Ada","password":"…"}
//! PATCH /api/v1/admin/users/12 {"role":"ADMIN","isActive":false}
//! DELETE /api/v1/admin/users/12
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    AuditAction, AuditLimit, AuditLogEntry, AuditLogFilter, AuditResource, DEFAULT_AUDIT_LIMIT,
    Error, NewUserRequest, Role, UserAccount, UserId, UserUpdateRequest, UserValidationError,
};
use crate::inbound::http::customers::DeleteResponse;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::AdminIdentity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field_error, parse_id, parse_optional_date_bound, parse_tag, request_metadata,
};

/// `type` value selecting the security view.
pub const SECURITY_LOG_TYPE: &str = "security";

/// Audit log query string.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditLogParams {
    /// `security` selects failed logins, throttling, and IP blocks.
    #[serde(rename = "type")]
    pub log_type: Option<String>,
    /// Row cap, at most 1000; absent or `0` means 100.
    pub limit: Option<u32>,
    /// Restrict to one acting user.
    pub user_id: Option<i32>,
    /// One action or a comma-separated list.
    pub action: Option<String>,
    /// Restrict to one resource, e.g. `parcels`.
    pub resource: Option<String>,
    /// RFC 3339 or `YYYY-MM-DD`, inclusive.
    pub start_date: Option<String>,
    /// RFC 3339 or `YYYY-MM-DD`, inclusive.
    pub end_date: Option<String>,
}

/// Actor summary joined onto audit entries.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuditActorResponse {
    /// Account id.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
}

/// Audit entry as sent to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    /// Entry id.
    pub id: i32,
    /// Acting user id, kept after the account is removed.
    pub user_id: Option<i32>,
    /// Acting user, when the account still exists.
    pub user: Option<AuditActorResponse>,
    /// Event kind.
    #[schema(example = "LOGIN")]
    pub action: String,
    /// Affected resource name.
    pub resource: String,
    /// Affected record id.
    pub resource_id: Option<String>,
    /// Structured context.
    pub details: Option<Value>,
    /// Client address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// `SUCCESS`, `FAILURE` or `BLOCKED`.
    #[schema(example = "SUCCESS")]
    pub status: String,
    /// Event time.
    pub created_at: DateTime<Utc>,
}

impl From<AuditLogEntry> for AuditLogResponse {
    fn from(entry: AuditLogEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id.map(UserId::get),
            user: entry.actor.map(|actor| AuditActorResponse {
                id: actor.id.get(),
                name: actor.name,
                email: actor.email,
            }),
            action: entry.action.as_str().to_owned(),
            resource: entry.resource.as_str().to_owned(),
            resource_id: entry.resource_id,
            details: entry.details,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            status: entry.status.as_str().to_owned(),
            created_at: entry.created_at,
        }
    }
}

/// Account as sent to clients. Password hashes never leave the service.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Account id.
    pub id: i32,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// `USER` or `ADMIN`.
    #[schema(value_type = String, example = "USER")]
    pub role: Role,
    /// Disabled accounts cannot sign in.
    pub is_active: bool,
    /// Last successful sign-in.
    pub last_login: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id.get(),
            email: account.email,
            name: account.name,
            role: account.role,
            is_active: account.is_active,
            last_login: account.last_login,
            created_at: account.created_at,
        }
    }
}

/// Body of `POST /admin/users`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Initial password, at least eight characters.
    pub password: String,
    /// `USER` (default) or `ADMIN`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `PATCH /admin/users/{id}`. Absent or empty fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New login email.
    #[serde(default)]
    pub email: Option<String>,
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// `USER` or `ADMIN`.
    #[serde(default)]
    pub role: Option<String>,
    /// Enable or disable sign-in.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Replacement password, at least eight characters.
    #[serde(default)]
    pub password: Option<String>,
}

const ID_FIELD: FieldName = FieldName::new("id");

fn parse_role(raw: Option<&str>) -> Result<Option<Role>, Error> {
    raw.filter(|tag| !tag.is_empty())
        .map(|tag| parse_tag::<Role>(tag, FieldName::new("role")))
        .transpose()
}

fn audit_filter(params: AuditLogParams) -> Result<AuditLogFilter, Error> {
    let user_id = params
        .user_id
        .map(|raw| parse_id(raw, FieldName::new("userId"), UserId::new))
        .transpose()?;
    let actions = params
        .action
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(|tag| parse_tag::<AuditAction>(tag, FieldName::new("action")))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();
    let resource = params
        .resource
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| AuditResource::new(raw).map_err(|err| field_error(FieldName::new("resource"), err)))
        .transpose()?;
    Ok(AuditLogFilter {
        user_id,
        actions,
        resource,
        start: parse_optional_date_bound(params.start_date.as_deref(), FieldName::new("startDate"))?,
        end: parse_optional_date_bound(params.end_date.as_deref(), FieldName::new("endDate"))?,
        limit: AuditLimit::clamped(params.limit, DEFAULT_AUDIT_LIMIT),
    })
}

fn map_user_validation_error(err: UserValidationError) -> Error {
    let field = match err {
        UserValidationError::InvalidEmail(_) => "email",
        UserValidationError::EmptyName => "name",
        UserValidationError::UnknownRole(_) => "role",
        UserValidationError::NonPositiveId(_) => "id",
        UserValidationError::PasswordTooShort { .. } => "password",
    };
    field_error(FieldName::new(field), err)
}

/// Audit trail, newest first. `type=security` selects the security view.
#[utoipa::path(
    get,
    path = "/api/v1/admin/audit-logs",
    params(AuditLogParams),
    responses(
        (status = 200, description = "Audit entries", body = [AuditLogResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listAuditLogs"
)]
#[get("/admin/audit-logs")]
pub async fn list_audit_logs(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
    params: web::Query<AuditLogParams>,
) -> ApiResult<web::Json<Vec<AuditLogResponse>>> {
    let params = params.into_inner();
    let entries = if params.log_type.as_deref() == Some(SECURITY_LOG_TYPE) {
        state
            .audit
            .query_security_logs(Some(
                params
                    .limit
                    .filter(|&limit| limit > 0)
                    .unwrap_or(DEFAULT_AUDIT_LIMIT),
            ))
            .await?
    } else {
        state.audit.query_audit_logs(audit_filter(params)?).await?
    };
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Every account, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "Accounts", body = [UserResponse]),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(users.into_iter().map(Into::into).collect()))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createUser"
)]
#[post("/admin/users")]
pub async fn create_user(
    AdminIdentity(actor): AdminIdentity,
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let CreateUserRequest {
        email,
        name,
        password,
        role,
    } = payload.into_inner();
    let role = parse_role(role.as_deref())?;
    let request = NewUserRequest::try_from_parts(&email, &name, &password, role)
        .map_err(map_user_validation_error)?;
    let created = state
        .users
        .create_user(actor, request, &request_metadata(&req))
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(created)))
}

/// Change an account. Passwords are re-hashed; audit details list only the
/// changed field names.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/{id}",
    params(("id" = i32, Path, description = "Account id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 404, description = "Unknown account", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateUser"
)]
#[patch("/admin/users/{id}")]
pub async fn update_user(
    AdminIdentity(actor): AdminIdentity,
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_id(path.into_inner(), ID_FIELD, UserId::new)?;
    let UpdateUserRequest {
        email,
        name,
        role,
        is_active,
        password,
    } = payload.into_inner();
    let role = parse_role(role.as_deref())?;
    let request = UserUpdateRequest::try_from_parts(
        email.as_deref(),
        name.as_deref(),
        role,
        is_active,
        password.as_deref(),
    )
    .map_err(map_user_validation_error)?;
    let updated = state
        .users
        .update_user(actor, id, request, &request_metadata(&req))
        .await?;
    Ok(web::Json(updated.into()))
}

/// Delete an account. Administrators cannot delete themselves.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 400, description = "Attempted to delete own account", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 404, description = "Unknown account", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteUser"
)]
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    AdminIdentity(actor): AdminIdentity,
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<DeleteResponse>> {
    let id = parse_id(path.into_inner(), ID_FIELD, UserId::new)?;
    state
        .users
        .delete_user(actor, id, &request_metadata(&req))
        .await?;
    Ok(web::Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::TimeZone;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{AuditActor, AuditStatus};
    use crate::inbound::http::test_utils::{TestPorts, admin, login_cookie, test_app, user};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/api/v1")
                .service(list_audit_logs)
                .service(list_users)
                .service(create_user)
                .service(update_user)
                .service(delete_user),
        );
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0)
            .single()
            .expect("valid time")
    }

    fn entry(id: i32, action: AuditAction) -> AuditLogEntry {
        AuditLogEntry {
            id,
            actor: Some(AuditActor {
                id: UserId::new(3).expect("valid id"),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            }),
            user_id: Some(UserId::new(3).expect("valid id")),
            action,
            resource: AuditResource::new("auth").expect("valid resource"),
            resource_id: None,
            details: None,
            ip_address: Some("203.0.113.9".into()),
            user_agent: None,
            status: AuditStatus::Success,
            created_at: at(1),
        }
    }

    fn account() -> UserAccount {
        UserAccount {
            id: UserId::new(12).expect("valid id"),
            email: "grace@example.com".into(),
            name: "Grace".into(),
            role: Role::User,
            is_active: true,
            password_hash: "$2b$10$secret".into(),
            last_login: None,
            created_at: at(2),
        }
    }

    #[rstest]
    #[case(test::TestRequest::get().uri("/api/v1/admin/audit-logs"))]
    #[case(test::TestRequest::get().uri("/api/v1/admin/audit-logs?type=security"))]
    #[case(test::TestRequest::get().uri("/api/v1/admin/users"))]
    #[case(test::TestRequest::post().uri("/api/v1/admin/users").set_json(json!({"email":"a@b.c","name":"A","password":"longenough"})))]
    #[case(test::TestRequest::get().uri("/api/v1/admin/audit-logs?limit=abc"))]
    #[case(test::TestRequest::post().uri("/api/v1/admin/users").insert_header(("content-type", "application/json")).set_payload("{not json"))]
    #[case(test::TestRequest::patch().uri("/api/v1/admin/users/12").set_json(json!({"role":"ADMIN"})))]
    #[case(test::TestRequest::patch().uri("/api/v1/admin/users/abc").insert_header(("content-type", "application/json")).set_payload("{not json"))]
    #[case(test::TestRequest::delete().uri("/api/v1/admin/users/12"))]
    #[actix_rt::test]
    async fn anonymous_callers_get_401_without_port_calls(#[case] request: test::TestRequest) {
        let app = test::init_service(test_app(TestPorts::default().into_state()).configure(routes))
            .await;
        let response = test::call_service(&app, request.to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body.get("error").and_then(Value::as_str), Some("Unauthorized"));
    }

    #[rstest]
    #[case(test::TestRequest::get().uri("/api/v1/admin/audit-logs"))]
    #[case(test::TestRequest::get().uri("/api/v1/admin/audit-logs?type=security"))]
    #[case(test::TestRequest::get().uri("/api/v1/admin/audit-logs?startDate=yesterday"))]
    #[case(test::TestRequest::get().uri("/api/v1/admin/users"))]
    #[case(test::TestRequest::post().uri("/api/v1/admin/users").insert_header(("content-type", "application/json")).set_payload("{not json"))]
    #[case(test::TestRequest::patch().uri("/api/v1/admin/users/7").set_json(json!({"role":"ADMIN"})))]
    #[case(test::TestRequest::delete().uri("/api/v1/admin/users/12"))]
    #[actix_rt::test]
    async fn regular_users_get_403_without_port_calls(#[case] request: test::TestRequest) {
        let app = test::init_service(test_app(TestPorts::default().into_state()).configure(routes))
            .await;
        let cookie = login_cookie(&app, user()).await;
        let response = test::call_service(&app, request.cookie(cookie).to_request()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn security_view_uses_the_security_query() {
        let mut ports = TestPorts::default();
        ports
            .audit
            .expect_query_security_logs()
            .with(eq(Some(10)))
            .times(1)
            .return_once(|_| Ok(vec![entry(1, AuditAction::FailedLogin)]));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/admin/audit-logs?type=security&limit=10")
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body.pointer("/0/action").and_then(Value::as_str), Some("FAILED_LOGIN"));
        assert_eq!(body.pointer("/0/user/name").and_then(Value::as_str), Some("Ada"));
    }

    #[actix_web::test]
    async fn security_view_defaults_to_one_hundred_rows() {
        let mut ports = TestPorts::default();
        ports
            .audit
            .expect_query_security_logs()
            .with(eq(Some(DEFAULT_AUDIT_LIMIT)))
            .return_once(|_| Ok(Vec::new()));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/admin/audit-logs?type=security")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn security_view_treats_zero_as_the_default() {
        let mut ports = TestPorts::default();
        ports
            .audit
            .expect_query_security_logs()
            .with(eq(Some(DEFAULT_AUDIT_LIMIT)))
            .times(1)
            .return_once(|_| Ok(Vec::new()));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/admin/audit-logs?type=security&limit=0")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn filtered_view_treats_zero_as_the_default() {
        let mut ports = TestPorts::default();
        ports
            .audit
            .expect_query_audit_logs()
            .withf(|filter| filter.limit.get() == DEFAULT_AUDIT_LIMIT)
            .times(1)
            .return_once(|_| Ok(Vec::new()));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/admin/audit-logs?limit=0")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn filtered_view_parses_every_parameter() {
        let mut ports = TestPorts::default();
        ports
            .audit
            .expect_query_audit_logs()
            .withf(|filter| {
                filter.user_id.map(UserId::get) == Some(3)
                    && filter.actions == vec![AuditAction::Login, AuditAction::Logout]
                    && filter.resource.as_ref().map(AuditResource::as_str) == Some("auth")
                    && filter.start == Some(at(1))
                    && filter.end == Some(at(2))
                    && filter.limit.get() == 25
            })
            .times(1)
            .return_once(|_| Ok(vec![entry(2, AuditAction::Login)]));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::get()
            .uri(
                "/api/v1/admin/audit-logs?userId=3&action=LOGIN,LOGOUT&resource=auth\
                 &startDate=2024-05-01&endDate=2024-05-02T00:00:00Z&limit=25",
            )
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body.pointer("/0/ipAddress").and_then(Value::as_str), Some("203.0.113.9"));
    }

    #[actix_web::test]
    async fn unknown_type_falls_back_to_the_filtered_view() {
        let mut ports = TestPorts::default();
        ports
            .audit
            .expect_query_audit_logs()
            .withf(|filter| filter.limit.get() == DEFAULT_AUDIT_LIMIT && filter.actions.is_empty())
            .return_once(|_| Ok(Vec::new()));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/admin/audit-logs?type=everything")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[rstest]
    #[case("action=DANCE", "action")]
    #[case("startDate=yesterday", "startDate")]
    #[case("endDate=2024-02-30", "endDate")]
    #[case("userId=0", "userId")]
    #[actix_rt::test]
    async fn malformed_filters_are_400(#[case] query: &str, #[case] field: &str) {
        let app = test::init_service(test_app(TestPorts::default().into_state()).configure(routes))
            .await;
        let cookie = login_cookie(&app, admin()).await;
        let request = test::TestRequest::get()
            .uri(&format!("/api/v1/admin/audit-logs?{query}"))
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body.pointer("/details/field").and_then(Value::as_str), Some(field));
    }

    #[actix_web::test]
    async fn repository_failures_are_redacted() {
        let mut ports = TestPorts::default();
        ports
            .audit
            .expect_query_audit_logs()
            .return_once(|_| Err(Error::internal("relation audit_logs does not exist")));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/admin/audit-logs")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            body.get("error").and_then(Value::as_str),
            Some("Internal server error")
        );
    }

    #[actix_web::test]
    async fn user_listing_omits_password_hashes() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_list_users()
            .times(1)
            .return_once(|| Ok(vec![account()]));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/admin/users")
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        let first = body.get(0).expect("one account");
        assert_eq!(first.get("email").and_then(Value::as_str), Some("grace@example.com"));
        assert_eq!(first.get("isActive").and_then(Value::as_bool), Some(true));
        assert!(!body.to_string().contains("secret"));
    }

    #[actix_web::test]
    async fn admins_create_accounts() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_create_user()
            .withf(|actor, request, metadata| {
                *actor == admin()
                    && request.email().as_str() == "grace@example.com"
                    && request.role() == Role::Admin
                    && metadata.user_agent.as_deref() == Some("admin-ui")
            })
            .times(1)
            .return_once(|_, _, _| Ok(account()));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::post()
            .uri("/api/v1/admin/users")
            .cookie(cookie)
            .insert_header(("user-agent", "admin-ui"))
            .set_json(json!({
                "email": "grace@example.com",
                "name": "Grace",
                "password": "correct horse",
                "role": "ADMIN"
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[rstest]
    #[case(json!({"email": "nope", "name": "G", "password": "correct horse"}), "email")]
    #[case(json!({"email": "g@example.com", "name": " ", "password": "correct horse"}), "name")]
    #[case(json!({"email": "g@example.com", "name": "G", "password": "short"}), "password")]
    #[case(json!({"email": "g@example.com", "name": "G", "password": "correct horse", "role": "ROOT"}), "role")]
    #[actix_rt::test]
    async fn invalid_accounts_are_400(#[case] payload: Value, #[case] field: &str) {
        let app = test::init_service(test_app(TestPorts::default().into_state()).configure(routes))
            .await;
        let cookie = login_cookie(&app, admin()).await;
        let request = test::TestRequest::post()
            .uri("/api/v1/admin/users")
            .cookie(cookie)
            .set_json(payload)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body.pointer("/details/field").and_then(Value::as_str), Some(field));
    }

    #[actix_web::test]
    async fn duplicate_emails_are_409() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_create_user()
            .return_once(|_, _, _| Err(Error::conflict("an account with email g@example.com already exists")));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::post()
            .uri("/api/v1/admin/users")
            .cookie(cookie)
            .set_json(json!({"email": "g@example.com", "name": "G", "password": "correct horse"}))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn admins_update_accounts() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_update_user()
            .withf(|actor, id, request, _| {
                *actor == admin()
                    && id.get() == 12
                    && request.role() == Some(Role::Admin)
                    && request.is_active() == Some(false)
                    && request.email().is_none()
                    && request.password() == Some("correct horse")
            })
            .times(1)
            .return_once(|_, _, _, _| {
                Ok(UserAccount {
                    role: Role::Admin,
                    is_active: false,
                    ..account()
                })
            });
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::patch()
            .uri("/api/v1/admin/users/12")
            .cookie(cookie)
            .set_json(json!({
                "email": "",
                "role": "ADMIN",
                "isActive": false,
                "password": "correct horse"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body.get("role").and_then(Value::as_str), Some("ADMIN"));
        assert_eq!(body.get("isActive").and_then(Value::as_bool), Some(false));
        assert!(body.get("passwordHash").is_none());
    }

    #[rstest]
    #[case("/api/v1/admin/users/12", json!({"email": "nope"}), "email")]
    #[case("/api/v1/admin/users/12", json!({"role": "ROOT"}), "role")]
    #[case("/api/v1/admin/users/12", json!({"password": "short"}), "password")]
    #[case("/api/v1/admin/users/0", json!({"name": "Grace"}), "id")]
    #[actix_rt::test]
    async fn invalid_updates_are_400(#[case] uri: &str, #[case] payload: Value, #[case] field: &str) {
        let app = test::init_service(test_app(TestPorts::default().into_state()).configure(routes))
            .await;
        let cookie = login_cookie(&app, admin()).await;
        let request = test::TestRequest::patch()
            .uri(uri)
            .cookie(cookie)
            .set_json(payload)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body.pointer("/details/field").and_then(Value::as_str), Some(field));
    }

    #[actix_web::test]
    async fn updating_an_unknown_account_is_404() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_update_user()
            .return_once(|_, _, _, _| Err(Error::not_found("user 99 not found")));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::patch()
            .uri("/api/v1/admin/users/99")
            .cookie(cookie)
            .set_json(json!({"name": "Nobody"}))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn admins_delete_accounts() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_delete_user()
            .withf(|actor, id, _| *actor == admin() && id.get() == 12)
            .times(1)
            .return_once(|_, _, _| Ok(()));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::delete()
            .uri("/api/v1/admin/users/12")
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, json!({ "success": true }));
    }

    #[actix_web::test]
    async fn self_deletion_is_400() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_delete_user()
            .return_once(|_, _, _| Err(Error::invalid_request("cannot delete your own account")));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::delete()
            .uri("/api/v1/admin/users/1")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
