//! Driven port resolving the caller's identity from the ambient session.
//!
//! The access gate receives a resolver explicitly rather than reaching for a
//! global, so tests can substitute a canned identity and the HTTP adapter can
//! back it with the cookie session.

use async_trait::async_trait;

use crate::domain::{Error, Identity};

/// Source of the current caller's identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Return the identity attached to the current session, or `None` when
    /// no valid session exists.
    async fn resolve(&self) -> Result<Option<Identity>, Error>;
}

/// Resolver returning a fixed answer; useful for tests and tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSessionResolver(pub Option<Identity>);

#[async_trait]
impl SessionResolver for FixedSessionResolver {
    async fn resolve(&self) -> Result<Option<Identity>, Error> {
        Ok(self.0)
    }
}
