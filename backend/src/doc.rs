//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! error wrappers from [`crate::inbound::http::schemas`], and the session
//! cookie security scheme. Request and response DTOs referenced by the paths
//! are collected automatically.
//!
//! The document backs Swagger UI in debug builds and is printed by the
//! `openapi-dump` binary.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Parcel dashboard API",
        description = "Session-authenticated parcel, CRM, notification, and audit endpoints plus the analysis proxy."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::auth::change_password,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::create_notification,
        crate::inbound::http::notifications::mark_all_read,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::admin::list_audit_logs,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::create_user,
        crate::inbound::http::admin::update_user,
        crate::inbound::http::admin::delete_user,
        crate::inbound::http::parcels::list_parcels,
        crate::inbound::http::parcels::create_parcel,
        crate::inbound::http::parcels::get_parcel,
        crate::inbound::http::parcels::update_parcel,
        crate::inbound::http::customers::list_customers,
        crate::inbound::http::customers::create_customer,
        crate::inbound::http::customers::get_customer,
        crate::inbound::http::customers::update_customer,
        crate::inbound::http::customers::delete_customer,
        crate::inbound::http::proxy::forward,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "auth", description = "Session login, logout, and identity"),
        (name = "notifications", description = "Shared notification feed"),
        (name = "admin", description = "Administrator-only audit and account views"),
        (name = "parcels", description = "Parcel records and CRM stages"),
        (name = "crm", description = "Customers linked to parcels"),
        (name = "proxy", description = "Pass-through to the analysis service"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
