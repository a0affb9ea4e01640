//! Cookie session access for HTTP handlers.
//!
//! Handlers never touch `actix_session` directly. They persist or purge an
//! [`Identity`] through [`SessionContext`] and hand the access gate a
//! [`SessionSnapshot`], a `Send` resolver captured from the cookie.
//!
//! Gated handlers take [`Authenticated`] or [`AdminIdentity`] as their first
//! argument. Actix polls extractors in argument order and stops at the first
//! failure, so the gate answers before any body, query, or path is parsed.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::SessionResolver;
use crate::domain::{Error, Identity, Role, UserId, require_admin, require_authenticated};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Handler-facing wrapper around the Actix session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the signed-in identity, rotating the session id first.
    pub fn persist_identity(&self, identity: Identity) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, identity.user_id.get())
            .and_then(|()| self.0.insert(ROLE_KEY, identity.role.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop everything stored in the session.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Identity stored in the cookie.
    ///
    /// Tampered or partial values read as "no session" and are logged.
    pub fn identity(&self) -> Result<Option<Identity>, Error> {
        let read_error =
            |error: actix_session::SessionGetError| Error::internal(format!("failed to read session: {error}"));
        let user_id = self.0.get::<i32>(USER_ID_KEY).map_err(read_error)?;
        let role = self.0.get::<String>(ROLE_KEY).map_err(read_error)?;
        let (Some(raw_id), Some(raw_role)) = (user_id, role) else {
            return Ok(None);
        };
        let parsed = UserId::new(raw_id)
            .map_err(|error| error.to_string())
            .and_then(|id| {
                raw_role
                    .parse::<Role>()
                    .map(|role| Identity::new(id, role))
                    .map_err(|error| error.to_string())
            });
        match parsed {
            Ok(identity) => Ok(Some(identity)),
            Err(error) => {
                warn!(%error, "invalid identity in session cookie");
                Ok(None)
            }
        }
    }

    /// Capture the current identity for the access gate.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot(self.identity())
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(Self::new) })
    }
}

/// Session state captured at the start of a request.
#[derive(Debug, Clone)]
pub struct SessionSnapshot(Result<Option<Identity>, Error>);

#[async_trait]
impl SessionResolver for SessionSnapshot {
    async fn resolve(&self) -> Result<Option<Identity>, Error> {
        self.0.clone()
    }
}

/// Signed-in caller of any role; anonymous requests fail with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated(pub Identity);

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let snapshot = session.await?.snapshot();
            let identity = require_authenticated(&snapshot).await?;
            Ok(Self(identity))
        })
    }
}

/// Signed-in administrator; anonymous requests fail with 401, others with 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminIdentity(pub Identity);

impl FromRequest for AdminIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let snapshot = session.await?.snapshot();
            let identity = require_admin(&snapshot).await?;
            Ok(Self(identity))
        })
    }
}
