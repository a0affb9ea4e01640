//! Sign-in, sign-out, "who am I", and self-service password change.
//!
//! ```text
//! POST /api/v1/login {"email":"ada@example.com","password":"secret"}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! POST /api/v1/change-password {"currentPassword":"…","newPassword":"…"}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    Identity, LoginCredentials, LoginValidationError, PasswordChange,
    PasswordChangeValidationError, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::{Authenticated, SessionContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, request_metadata};

/// Login request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email; trimmed and lower-cased before lookup.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Identity of the signed-in caller.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    /// Account id.
    #[schema(example = 7)]
    pub id: i32,
    /// `USER` or `ADMIN`.
    #[schema(value_type = String, example = "USER")]
    pub role: Role,
}

/// Body of `POST /change-password`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Password the caller signs in with today.
    pub current_password: String,
    /// Replacement, at least eight characters.
    pub new_password: String,
}

/// Outcome of a password change.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PasswordChangedResponse {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// Human-readable confirmation.
    #[schema(example = "password updated")]
    pub message: String,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.user_id.get(),
            role: identity.role,
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> crate::domain::Error {
    let field = match err {
        LoginValidationError::EmptyEmail | LoginValidationError::InvalidEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(FieldName::new(field), err)
}

fn map_password_change_error(err: PasswordChangeValidationError) -> crate::domain::Error {
    let field = match err {
        PasswordChangeValidationError::EmptyCurrentPassword => "currentPassword",
        PasswordChangeValidationError::NewPasswordTooShort { .. } => "newPassword",
    };
    field_error(FieldName::new(field), err)
}

/// Verify credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = IdentityResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<IdentityResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_validation_error)?;
    let identity = state
        .login
        .authenticate(&credentials, &request_metadata(&req))
        .await?;
    session.persist_identity(identity)?;
    Ok(web::Json(identity.into()))
}

/// End the session. Always succeeds, signed in or not.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> HttpResponse {
    if let Ok(Some(identity)) = session.identity() {
        state.login.logout(identity, &request_metadata(&req)).await;
        info!(user_id = %identity.user_id, "signed out");
    }
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Identity stored in the current session.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current identity", body = IdentityResponse),
        (status = 401, description = "No session", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn me(Authenticated(identity): Authenticated) -> web::Json<IdentityResponse> {
    web::Json(identity.into())
}

/// Replace the caller's password. The session stays valid.
#[utoipa::path(
    post,
    path = "/api/v1/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = PasswordChangedResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "No session or wrong current password", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "changePassword"
)]
#[post("/change-password")]
pub async fn change_password(
    Authenticated(identity): Authenticated,
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<web::Json<PasswordChangedResponse>> {
    let ChangePasswordRequest {
        current_password,
        new_password,
    } = payload.into_inner();
    let change = PasswordChange::try_from_parts(&current_password, &new_password)
        .map_err(map_password_change_error)?;
    state
        .login
        .change_password(identity, &change, &request_metadata(&req))
        .await?;
    Ok(web::Json(PasswordChangedResponse {
        success: true,
        message: "password updated".to_owned(),
    }))
}
