//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use crate::domain::ports::{
    MockAnalysisProxy, MockAuditLogQuery, MockCustomerCommand, MockCustomerQuery,
    MockLoginService, MockNotificationCommand, MockNotificationQuery, MockParcelCommand,
    MockParcelQuery, MockUserAdministration,
};
use crate::domain::{Error, Identity, Role, UserId};

use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{json_config, path_config, query_config};

/// Session middleware with a fresh key and an insecure `session` cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `response`.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Mock ports for handler tests.
///
/// Every mock starts without expectations, so any call a test did not set up
/// panics. That makes "the gate rejected before touching data" checkable by
/// simply leaving a mock untouched.
#[derive(Default)]
pub struct TestPorts {
    /// Backs `HttpState::login`.
    pub login: MockLoginService,
    /// Backs `HttpState::users`.
    pub users: MockUserAdministration,
    /// Backs `HttpState::audit`.
    pub audit: MockAuditLogQuery,
    /// Backs `HttpState::notifications`.
    pub notifications: MockNotificationCommand,
    /// Backs `HttpState::notifications_query`.
    pub notifications_query: MockNotificationQuery,
    /// Backs `HttpState::parcels`.
    pub parcels: MockParcelCommand,
    /// Backs `HttpState::parcels_query`.
    pub parcels_query: MockParcelQuery,
    /// Backs `HttpState::customers`.
    pub customers: MockCustomerCommand,
    /// Backs `HttpState::customers_query`.
    pub customers_query: MockCustomerQuery,
    /// Backs `HttpState::analysis`.
    pub analysis: MockAnalysisProxy,
}

impl TestPorts {
    /// Freeze the mocks into handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            login: Arc::new(self.login),
            users: Arc::new(self.users),
            audit: Arc::new(self.audit),
            notifications: Arc::new(self.notifications),
            notifications_query: Arc::new(self.notifications_query),
            parcels: Arc::new(self.parcels),
            parcels_query: Arc::new(self.parcels_query),
            customers: Arc::new(self.customers),
            customers_query: Arc::new(self.customers_query),
            analysis: Arc::new(self.analysis),
        })
    }
}

/// Install a session for `identity` and return its cookie.
pub async fn login_cookie<S>(app: &S, identity: Identity) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let uri = format!(
        "/__test/login/{}/{}",
        identity.user_id.get(),
        identity.role.as_str()
    );
    let response = test::call_service(app, test::TestRequest::get().uri(&uri).to_request()).await;
    session_cookie(&response)
}

/// Route used by [`login_cookie`] to mint sessions without the login port.
pub async fn test_login(
    session: SessionContext,
    path: web::Path<(i32, String)>,
) -> Result<HttpResponse, Error> {
    let (raw_id, raw_role) = path.into_inner();
    let user_id = UserId::new(raw_id).map_err(|err| Error::invalid_request(err.to_string()))?;
    let role: Role = raw_role
        .parse()
        .map_err(|err: crate::domain::UserValidationError| Error::invalid_request(err.to_string()))?;
    session.persist_identity(Identity::new(user_id, role))?;
    Ok(HttpResponse::Ok().finish())
}

/// App with test sessions, the mocked state, and the login helper route.
pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(test_session_middleware())
        .route("/__test/login/{id}/{role}", web::get().to(test_login))
}

/// Regular user with id 7.
pub fn user() -> Identity {
    Identity::new(UserId::new(7).expect("valid id"), Role::User)
}

/// Administrator with id 1.
pub fn admin() -> Identity {
    Identity::new(UserId::new(1).expect("valid id"), Role::Admin)
}
