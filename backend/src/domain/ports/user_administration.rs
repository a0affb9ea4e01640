//! Driving port for admin account management.

use async_trait::async_trait;

use crate::domain::{
    Error, Identity, NewUserRequest, RequestMetadata, UserAccount, UserId, UserUpdateRequest,
};

/// Account management use-cases; callers run the admin gate first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Every account, newest first.
    async fn list_users(&self) -> Result<Vec<UserAccount>, Error>;

    /// Create an account on behalf of `actor`.
    async fn create_user(
        &self,
        actor: Identity,
        request: NewUserRequest,
        metadata: &RequestMetadata,
    ) -> Result<UserAccount, Error>;

    /// Change an account on behalf of `actor`. An empty request returns the
    /// account unchanged.
    async fn update_user(
        &self,
        actor: Identity,
        id: UserId,
        request: UserUpdateRequest,
        metadata: &RequestMetadata,
    ) -> Result<UserAccount, Error>;

    /// Remove an account. Administrators cannot delete themselves.
    async fn delete_user(
        &self,
        actor: Identity,
        id: UserId,
        metadata: &RequestMetadata,
    ) -> Result<(), Error>;
}
