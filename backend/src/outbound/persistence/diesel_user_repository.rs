//! PostgreSQL-backed [`UserRepository`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{NewUserAccount, UserAccount, UserId, UserPatch};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error, unique_violation};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{collect_rows, user_from_row};
use super::schema::users;

/// Diesel-backed account store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error, operation: &'static str) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        operation,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| diesel_error(err, "find user by email"))?;
        row.map(user_from_row)
            .transpose()
            .map_err(UserRepositoryError::query)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| diesel_error(err, "find user by id"))?;
        row.map(user_from_row)
            .transpose()
            .map_err(UserRepositoryError::query)
    }

    async fn list(&self) -> Result<Vec<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by((users::created_at.desc(), users::id.desc()))
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "list users"))?;
        collect_rows(rows.into_iter().map(user_from_row), UserRepositoryError::query)
    }

    async fn insert(
        &self,
        account: &NewUserAccount,
        created_at: DateTime<Utc>,
    ) -> Result<UserAccount, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            email: account.email.as_str(),
            name: &account.name,
            password_hash: &account.password_hash,
            role: account.role.as_str(),
            is_active: true,
            created_at,
            updated_at: created_at,
        };
        let stored = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if unique_violation(&err).is_some() {
                    UserRepositoryError::duplicate_email(account.email.as_str())
                } else {
                    diesel_error(err, "insert user")
                }
            })?;
        user_from_row(stored).map_err(UserRepositoryError::query)
    }

    async fn touch_last_login(
        &self,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(id.get()))
            .set((users::last_login.eq(Some(at)), users::updated_at.eq(at)))
            .execute(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "touch last login"))?;
        Ok(())
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = UserChangeset {
            email: patch.email.as_ref().map(|email| email.as_str()),
            name: patch.name.as_deref(),
            role: patch.role.map(|role| role.as_str()),
            is_active: patch.is_active,
            password_hash: patch.password_hash.as_deref(),
            updated_at,
        };
        let row = diesel::update(users::table.find(id.get()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                let duplicate = unique_violation(&err).is_some();
                match &patch.email {
                    Some(email) if duplicate => {
                        UserRepositoryError::duplicate_email(email.as_str())
                    }
                    _ => diesel_error(err, "update user"),
                }
            })?;
        row.map(user_from_row)
            .transpose()
            .map_err(UserRepositoryError::query)
    }

    async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changed = diesel::update(users::table.find(id.get()))
            .set((
                users::password_hash.eq(password_hash),
                users::updated_at.eq(updated_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "set password hash"))?;
        Ok(changed > 0)
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "delete user"))?;
        Ok(removed > 0)
    }
}
