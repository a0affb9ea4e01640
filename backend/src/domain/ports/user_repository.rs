//! Port for user account persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewUserAccount, UserAccount, UserId, UserPatch};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => service_unavailable,
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => internal,
            "user repository query failed: {message}",
        /// An account with the same email already exists.
        DuplicateEmail { email: String } => conflict,
            "an account with email {email} already exists",
    }
}

/// User account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up an account by normalised email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Every account, newest first.
    async fn list(&self) -> Result<Vec<UserAccount>, UserRepositoryError>;

    /// Create an account.
    async fn insert(
        &self,
        account: &NewUserAccount,
        created_at: DateTime<Utc>,
    ) -> Result<UserAccount, UserRepositoryError>;

    /// Stamp a successful sign-in.
    async fn touch_last_login(
        &self,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError>;

    /// Apply `patch`; `None` when the account does not exist.
    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Replace the stored password hash; `false` when the account does not
    /// exist.
    async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, UserRepositoryError>;

    /// Remove an account; `false` when it did not exist.
    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError>;
}
