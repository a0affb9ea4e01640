//! Admin account management service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::auth::hash_password;
use crate::domain::ports::{AuditRecorder, UserAdministration, UserRepository};
use crate::domain::{
    AuditAction, AuditResource, Error, Identity, NewAuditLogEntry, NewUserRequest,
    PASSWORD_HASH_COST, RequestMetadata, UserAccount, UserId, UserUpdateRequest,
};

/// Message returned when an administrator tries to delete their own account.
pub const SELF_DELETE_MESSAGE: &str = "cannot delete your own account";

fn not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// Service implementing [`UserAdministration`].
#[derive(Clone)]
pub struct UserAdminService<U> {
    users: Arc<U>,
    audit: Arc<dyn AuditRecorder>,
    clock: Arc<dyn Clock>,
    hash_cost: u32,
}

impl<U> UserAdminService<U> {
    /// Create a service hashing passwords at [`PASSWORD_HASH_COST`].
    pub fn new(users: Arc<U>, audit: Arc<dyn AuditRecorder>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            audit,
            clock,
            hash_cost: PASSWORD_HASH_COST,
        }
    }

    /// Override the bcrypt cost; tests use the minimum.
    #[must_use]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }
}

impl<U> UserAdminService<U> {
    async fn hash(&self, password: &str) -> Result<String, Error> {
        let password = Zeroizing::new(password.to_owned());
        let cost = self.hash_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
    }

    async fn audit_user_change(
        &self,
        actor: Identity,
        action: AuditAction,
        id: UserId,
        metadata: &RequestMetadata,
        details: serde_json::Value,
    ) {
        self.audit
            .record(
                NewAuditLogEntry::success(
                    Some(actor.user_id),
                    action,
                    AuditResource::USERS,
                    metadata.clone(),
                )
                .with_resource_id(id)
                .with_details(details),
            )
            .await;
    }
}

#[async_trait]
impl<U> UserAdministration for UserAdminService<U>
where
    U: UserRepository,
{
    async fn list_users(&self) -> Result<Vec<UserAccount>, Error> {
        Ok(self.users.list().await?)
    }

    async fn create_user(
        &self,
        actor: Identity,
        request: NewUserRequest,
        metadata: &RequestMetadata,
    ) -> Result<UserAccount, Error> {
        let hash = self.hash(request.password()).await?;
        let account = self
            .users
            .insert(&request.into_account(hash), self.clock.utc())
            .await?;

        self.audit_user_change(
            actor,
            AuditAction::Create,
            account.id,
            metadata,
            json!({ "email": account.email, "role": account.role.as_str() }),
        )
        .await;
        info!(created = %account.id, by = %actor.user_id, "user account created");
        Ok(account)
    }

    async fn update_user(
        &self,
        actor: Identity,
        id: UserId,
        request: UserUpdateRequest,
        metadata: &RequestMetadata,
    ) -> Result<UserAccount, Error> {
        let hash = match request.password() {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };
        let patch = request.into_patch(hash);
        if patch.is_empty() {
            return self.users.find_by_id(id).await?.ok_or_else(|| not_found(id));
        }

        let updated = self
            .users
            .update(id, &patch, self.clock.utc())
            .await?
            .ok_or_else(|| not_found(id))?;

        self.audit_user_change(
            actor,
            AuditAction::Update,
            id,
            metadata,
            json!({ "fields": patch.changed_fields() }),
        )
        .await;
        info!(updated = %id, by = %actor.user_id, "user account updated");
        Ok(updated)
    }

    async fn delete_user(
        &self,
        actor: Identity,
        id: UserId,
        metadata: &RequestMetadata,
    ) -> Result<(), Error> {
        if id == actor.user_id {
            return Err(Error::invalid_request(SELF_DELETE_MESSAGE));
        }
        let Some(account) = self.users.find_by_id(id).await? else {
            return Err(not_found(id));
        };
        if !self.users.delete(id).await? {
            return Err(not_found(id));
        }
        self.audit_user_change(
            actor,
            AuditAction::Delete,
            id,
            metadata,
            json!({ "email": account.email }),
        )
        .await;
        info!(deleted = %id, by = %actor.user_id, "user account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::domain::auth::verify_password;
    use crate::domain::ports::{MockAuditRecorder, MockUserRepository, UserRepositoryError};
    use crate::domain::{ErrorCode, Role, UserId};
    use crate::test_support::{FixtureClock, admin, fixture_timestamp};

    fn service(
        users: MockUserRepository,
        audit: MockAuditRecorder,
    ) -> UserAdminService<MockUserRepository> {
        UserAdminService::new(
            Arc::new(users),
            Arc::new(audit),
            Arc::new(FixtureClock::new(fixture_timestamp())),
        )
        .with_hash_cost(4)
    }

    fn request() -> NewUserRequest {
        NewUserRequest::try_from_parts("grace@example.com", "Grace", "longenough", None)
            .expect("valid request")
    }

    #[rstest]
    #[tokio::test]
    async fn create_hashes_password_and_audits() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .withf(|account, _| {
                account.role == Role::User && verify_password("longenough", &account.password_hash)
            })
            .times(1)
            .return_once(|account, created_at| {
                Ok(UserAccount {
                    id: UserId::new(9).expect("id"),
                    email: account.email.as_str().to_owned(),
                    name: account.name.clone(),
                    role: account.role,
                    is_active: true,
                    password_hash: account.password_hash.clone(),
                    last_login: None,
                    created_at,
                })
            });
        let mut audit = MockAuditRecorder::new();
        audit
            .expect_record()
            .withf(|entry| {
                entry.action == AuditAction::Create
                    && entry.resource.as_str() == AuditResource::USERS
                    && entry.resource_id.as_deref() == Some("9")
            })
            .times(1)
            .return_const(());

        let created = service(users, audit)
            .create_user(admin(1), request(), &RequestMetadata::default())
            .await
            .expect("created");
        assert_eq!(created.email, "grace@example.com");
        assert_eq!(created.created_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .return_once(|_, _| Err(UserRepositoryError::duplicate_email("grace@example.com")));
        let mut audit = MockAuditRecorder::new();
        audit.expect_record().times(0);

        let error = service(users, audit)
            .create_user(admin(1), request(), &RequestMetadata::default())
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    fn stored(id: i32) -> UserAccount {
        UserAccount {
            id: UserId::new(id).expect("id"),
            email: "grace@example.com".into(),
            name: "Grace".into(),
            role: Role::User,
            is_active: true,
            password_hash: "$2b$04$unused".into(),
            last_login: None,
            created_at: fixture_timestamp(),
        }
    }

    fn expect_audit(action: AuditAction, resource_id: &'static str) -> MockAuditRecorder {
        let mut audit = MockAuditRecorder::new();
        audit
            .expect_record()
            .withf(move |entry| {
                entry.action == action
                    && entry.resource.as_str() == AuditResource::USERS
                    && entry.resource_id.as_deref() == Some(resource_id)
                    && entry.user_id == Some(UserId::new(1).expect("id"))
            })
            .times(1)
            .return_const(());
        audit
    }

    fn user_id(raw: i32) -> UserId {
        UserId::new(raw).expect("id")
    }

    #[rstest]
    #[tokio::test]
    async fn update_hashes_new_password_and_audits_field_names() {
        let mut users = MockUserRepository::new();
        users
            .expect_update()
            .withf(|id, patch, at| {
                id.get() == 9
                    && patch.role == Some(Role::Admin)
                    && patch
                        .password_hash
                        .as_deref()
                        .is_some_and(|hash| verify_password("new password", hash))
                    && *at == fixture_timestamp()
            })
            .times(1)
            .return_once(|_, _, _| Ok(Some(stored(9))));
        let mut audit = MockAuditRecorder::new();
        audit
            .expect_record()
            .withf(|entry| {
                entry.action == AuditAction::Update
                    && entry.resource_id.as_deref() == Some("9")
                    && entry.details
                        == Some(serde_json::json!({ "fields": ["role", "password"] }))
                    && !entry
                        .details
                        .as_ref()
                        .is_some_and(|details| details.to_string().contains("new password"))
            })
            .times(1)
            .return_const(());
        let request =
            UserUpdateRequest::try_from_parts(None, None, Some(Role::Admin), None, Some("new password"))
                .expect("valid update");

        let updated = service(users, audit)
            .update_user(admin(1), user_id(9), request, &RequestMetadata::default())
            .await
            .expect("updated");
        assert_eq!(updated.id, user_id(9));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_update_returns_the_stored_account_without_auditing() {
        let mut users = MockUserRepository::new();
        users.expect_update().times(0);
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(stored(id.get()))));
        let mut audit = MockAuditRecorder::new();
        audit.expect_record().times(0);

        let account = service(users, audit)
            .update_user(admin(1), user_id(9), UserUpdateRequest::default(), &RequestMetadata::default())
            .await
            .expect("unchanged");
        assert_eq!(account.email, "grace@example.com");
    }

    #[rstest]
    #[tokio::test]
    async fn updating_a_missing_account_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_update().return_once(|_, _, _| Ok(None));
        let mut audit = MockAuditRecorder::new();
        audit.expect_record().times(0);
        let request = UserUpdateRequest::try_from_parts(None, None, None, Some(false), None)
            .expect("valid update");

        let error = service(users, audit)
            .update_user(admin(1), user_id(404), request, &RequestMetadata::default())
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn update_to_a_taken_email_is_a_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_update()
            .return_once(|_, _, _| Err(UserRepositoryError::duplicate_email("ada@example.com")));
        let request = UserUpdateRequest::try_from_parts(Some("ada@example.com"), None, None, None, None)
            .expect("valid update");

        let error = service(users, MockAuditRecorder::new())
            .update_user(admin(1), user_id(9), request, &RequestMetadata::default())
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_and_audits() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(stored(id.get()))));
        users
            .expect_delete()
            .withf(|id| id.get() == 9)
            .times(1)
            .return_once(|_| Ok(true));

        service(users, expect_audit(AuditAction::Delete, "9"))
            .delete_user(admin(1), user_id(9), &RequestMetadata::default())
            .await
            .expect("deleted");
    }

    #[rstest]
    #[tokio::test]
    async fn admins_cannot_delete_themselves() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(0);
        users.expect_delete().times(0);
        let mut audit = MockAuditRecorder::new();
        audit.expect_record().times(0);

        let error = service(users, audit)
            .delete_user(admin(1), user_id(1), &RequestMetadata::default())
            .await
            .expect_err("self delete");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), SELF_DELETE_MESSAGE);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_missing_account_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));
        users.expect_delete().times(0);

        let error = service(users, MockAuditRecorder::new())
            .delete_user(admin(1), user_id(404), &RequestMetadata::default())
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn list_passes_through() {
        let mut users = MockUserRepository::new();
        users.expect_list().return_once(|| Ok(Vec::new()));

        let listed = service(users, MockAuditRecorder::new())
            .list_users()
            .await
            .expect("list");
        assert!(listed.is_empty());
    }
}
