//! Password sign-in service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::auth::{hash_password, verify_password};
use crate::domain::ports::{AuditRecorder, LoginService, UserRepository};
use crate::domain::{
    AuditAction, AuditResource, AuditStatus, Error, Identity, LoginCredentials, NewAuditLogEntry,
    PASSWORD_HASH_COST, PasswordChange, RequestMetadata, UserAccount,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";
/// Message returned when the current password does not match.
pub const WRONG_CURRENT_PASSWORD: &str = "current password is incorrect";

/// Login service backed by the user repository and bcrypt hashes.
#[derive(Clone)]
pub struct PasswordLoginService<U> {
    users: Arc<U>,
    audit: Arc<dyn AuditRecorder>,
    clock: Arc<dyn Clock>,
    hash_cost: u32,
}

impl<U> PasswordLoginService<U> {
    /// Create a service over `users`, recording outcomes with `audit`.
    pub fn new(users: Arc<U>, audit: Arc<dyn AuditRecorder>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            audit,
            clock,
            hash_cost: PASSWORD_HASH_COST,
        }
    }

    /// Override the bcrypt cost for replacement passwords; tests use the
    /// minimum.
    #[must_use]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }
}

impl<U> PasswordLoginService<U>
where
    U: UserRepository,
{
    async fn reject(
        &self,
        credentials: &LoginCredentials,
        account: Option<&UserAccount>,
        reason: &'static str,
        metadata: &RequestMetadata,
    ) -> Error {
        warn!(email = %credentials.email(), reason, "login rejected");
        let entry = NewAuditLogEntry::success(
            account.map(|a| a.id),
            AuditAction::FailedLogin,
            AuditResource::AUTH,
            metadata.clone(),
        )
        .with_status(AuditStatus::Failure)
        .with_details(json!({ "email": credentials.email(), "reason": reason }));
        self.audit.record(entry).await;
        Error::unauthorized(INVALID_CREDENTIALS)
    }
}

async fn password_matches(plain: &str, hash: &str) -> Result<bool, Error> {
    let plain = Zeroizing::new(plain.to_owned());
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
}

#[async_trait]
impl<U> LoginService for PasswordLoginService<U>
where
    U: UserRepository,
{
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
        metadata: &RequestMetadata,
    ) -> Result<Identity, Error> {
        let Some(account) = self.users.find_by_email(credentials.email()).await? else {
            return Err(self
                .reject(credentials, None, "unknown_email", metadata)
                .await);
        };
        if !account.is_active {
            return Err(self
                .reject(credentials, Some(&account), "inactive", metadata)
                .await);
        }
        if !password_matches(credentials.password(), &account.password_hash).await? {
            return Err(self
                .reject(credentials, Some(&account), "bad_password", metadata)
                .await);
        }

        if let Err(err) = self
            .users
            .touch_last_login(account.id, self.clock.utc())
            .await
        {
            warn!(user_id = %account.id, error = %err, "failed to record last login");
        }
        self.audit
            .record(NewAuditLogEntry::success(
                Some(account.id),
                AuditAction::Login,
                AuditResource::AUTH,
                metadata.clone(),
            ))
            .await;
        info!(user_id = %account.id, role = %account.role, "user signed in");
        Ok(account.identity())
    }

    async fn change_password(
        &self,
        identity: Identity,
        change: &PasswordChange,
        metadata: &RequestMetadata,
    ) -> Result<(), Error> {
        let user_id = identity.user_id;
        let account = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;

        let entry = NewAuditLogEntry::success(
            Some(user_id),
            AuditAction::PasswordChange,
            AuditResource::USERS,
            metadata.clone(),
        )
        .with_resource_id(user_id);

        if !password_matches(change.current(), &account.password_hash).await? {
            warn!(%user_id, "password change rejected");
            self.audit
                .record(
                    entry
                        .with_status(AuditStatus::Failure)
                        .with_details(json!({ "reason": "bad_password" })),
                )
                .await;
            return Err(Error::unauthorized(WRONG_CURRENT_PASSWORD));
        }

        let replacement = Zeroizing::new(change.replacement().to_owned());
        let cost = self.hash_cost;
        let hash = tokio::task::spawn_blocking(move || hash_password(&replacement, cost))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))??;
        if !self
            .users
            .set_password_hash(user_id, &hash, self.clock.utc())
            .await?
        {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }

        self.audit.record(entry).await;
        info!(%user_id, "password changed");
        Ok(())
    }

    async fn logout(&self, identity: Identity, metadata: &RequestMetadata) {
        self.audit
            .record(NewAuditLogEntry::success(
                Some(identity.user_id),
                AuditAction::Logout,
                AuditResource::AUTH,
                metadata.clone(),
            ))
            .await;
        info!(user_id = %identity.user_id, "user signed out");
    }
}

#[cfg(test)]
#[path = "login_service_tests.rs"]
mod tests;
