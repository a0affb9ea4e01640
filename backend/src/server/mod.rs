//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use parcel_backend::Trace;
#[cfg(debug_assertions)]
use parcel_backend::doc::ApiDoc;
use parcel_backend::inbound::http::admin::{
    create_user, delete_user, list_audit_logs, list_users, update_user,
};
use parcel_backend::inbound::http::auth::{change_password, login, logout, me};
use parcel_backend::inbound::http::customers::{
    create_customer, delete_customer, get_customer, list_customers, update_customer,
};
use parcel_backend::inbound::http::health::{HealthState, live, ready};
use parcel_backend::inbound::http::notifications::{
    create_notification, list_notifications, mark_all_read, mark_read,
};
use parcel_backend::inbound::http::parcels::{
    create_parcel, get_parcel, list_parcels, update_parcel,
};
use parcel_backend::inbound::http::proxy::forward;
use parcel_backend::inbound::http::state::HttpState;
use parcel_backend::inbound::http::validation::{json_config, path_config, query_config};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    // `mark-all-read` must precede `{id}` or the literal segment is parsed
    // as an identifier.
    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(me)
        .service(change_password)
        .service(list_notifications)
        .service(create_notification)
        .service(mark_all_read)
        .service(mark_read)
        .service(list_audit_logs)
        .service(list_users)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(list_parcels)
        .service(create_parcel)
        .service(get_parcel)
        .service(update_parcel)
        .service(list_customers)
        .service(create_customer)
        .service(get_customer)
        .service(update_customer)
        .service(delete_customer)
        .service(forward);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// The readiness flag flips once the listener is bound.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool,
        analysis,
    } = config;
    let http_state = build_http_state(&db_pool, analysis);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
