//! Driving port for credential sign-in.
//!
//! HTTP handlers call this port and persist the returned identity in the
//! session; they never see password hashes or the account store.

use async_trait::async_trait;

use crate::domain::{Error, Identity, LoginCredentials, PasswordChange, RequestMetadata};

/// Sign-in and credential use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and return the caller's identity.
    ///
    /// Any mismatch yields `Unauthorized("invalid credentials")` without
    /// revealing whether the email exists.
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
        metadata: &RequestMetadata,
    ) -> Result<Identity, Error>;

    /// Record a sign-out for the audit trail.
    async fn logout(&self, identity: Identity, metadata: &RequestMetadata);

    /// Replace the caller's password after proving the current one.
    ///
    /// A wrong current password yields `Unauthorized`; an account removed
    /// since sign-in yields `NotFound`.
    async fn change_password(
        &self,
        identity: Identity,
        change: &PasswordChange,
        metadata: &RequestMetadata,
    ) -> Result<(), Error>;
}
