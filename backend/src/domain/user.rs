//! User identity, roles, and account records.
//!
//! [`Identity`] is what the session carries: who the caller is and which role
//! they hold. [`UserAccount`] is the stored record behind it, including the
//! credential hash that never leaves the domain.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Validation errors raised by user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifiers are positive database keys.
    #[error("user id must be positive, got {0}")]
    NonPositiveId(i32),
    /// Role tags are `USER` or `ADMIN`.
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    /// Display names must not be blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Email addresses need an `@` and no surrounding whitespace.
    #[error("email '{0}' is not a valid address")]
    InvalidEmail(String),
    /// New passwords have a minimum length.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

/// Numeric user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct UserId(i32);

impl UserId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Examples
    /// ```
    /// use parcel_backend::domain::UserId;
    ///
    /// assert!(UserId::new(7).is_ok());
    /// assert!(UserId::new(0).is_err());
    /// ```
    pub fn new(raw: i32) -> Result<Self, UserValidationError> {
        if raw <= 0 {
            return Err(UserValidationError::NonPositiveId(raw));
        }
        Ok(Self(raw))
    }

    /// Raw database key.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i32 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular dashboard user; sees only owned or assigned records.
    #[default]
    User,
    /// Administrator; sees everything and manages accounts.
    Admin,
}

impl Role {
    /// Wire tag stored in sessions and the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller as resolved from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// Account identifier.
    pub user_id: UserId,
    /// Role granted at sign-in.
    pub role: Role,
}

impl Identity {
    /// Bundle an id with its role.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Validated email address, stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Trim, lower-case, and check the rough shape of an address.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        let valid = trimmed
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
            && !trimmed.contains(char::is_whitespace);
        if !valid {
            return Err(UserValidationError::InvalidEmail(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Borrow the normalised address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored user account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    /// Account identifier.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role tag.
    pub role: Role,
    /// Disabled accounts cannot sign in.
    pub is_active: bool,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Last successful sign-in.
    pub last_login: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Identity carried by sessions for this account.
    #[must_use]
    pub const fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }
}

/// Minimum accepted password length for new accounts.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validated input for creating an account. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    /// Login email.
    pub email: EmailAddress,
    /// Display name.
    pub name: String,
    /// Role tag.
    pub role: Role,
    /// bcrypt hash of the password.
    pub password_hash: String,
}

/// Admin request to create an account, validated but not yet hashed.
#[derive(Debug, Clone)]
pub struct NewUserRequest {
    email: EmailAddress,
    name: String,
    role: Role,
    password: Zeroizing<String>,
}

impl NewUserRequest {
    /// Validate raw request fields. A missing role defaults to [`Role::User`].
    pub fn try_from_parts(
        email: &str,
        name: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<Self, UserValidationError> {
        let email = EmailAddress::parse(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(Self {
            email,
            name: name.to_owned(),
            role: role.unwrap_or_default(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Trimmed display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Plain-text password, zeroised on drop.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Attach the computed hash.
    #[must_use]
    pub fn into_account(self, password_hash: String) -> NewUserAccount {
        NewUserAccount {
            email: self.email,
            name: self.name,
            role: self.role,
            password_hash,
        }
    }
}

/// Stored-level account changes. `None` leaves a column untouched and the
/// password is already hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// New login email.
    pub email: Option<EmailAddress>,
    /// New display name.
    pub name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// Enable or disable sign-in.
    pub is_active: Option<bool>,
    /// bcrypt hash replacing the current password.
    pub password_hash: Option<String>,
}

impl UserPatch {
    /// True when nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Wire names of the changed fields, for audit details.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("email", self.email.is_some()),
            ("name", self.name.is_some()),
            ("role", self.role.is_some()),
            ("isActive", self.is_active.is_some()),
            ("password", self.password_hash.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
    }
}

/// Admin request to change an account, validated but not yet hashed.
///
/// Empty strings count as "leave unchanged"; a name that is only
/// whitespace is rejected.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateRequest {
    email: Option<EmailAddress>,
    name: Option<String>,
    role: Option<Role>,
    is_active: Option<bool>,
    password: Option<Zeroizing<String>>,
}

impl UserUpdateRequest {
    /// Validate raw request fields.
    ///
    /// # Examples
    /// ```
    /// use parcel_backend::domain::{Role, UserUpdateRequest};
    ///
    /// let request = UserUpdateRequest::try_from_parts(Some(""), None, Some(Role::Admin), None, None)
    ///     .expect("valid update");
    /// assert!(request.email().is_none());
    /// assert_eq!(request.role(), Some(Role::Admin));
    /// ```
    pub fn try_from_parts(
        email: Option<&str>,
        name: Option<&str>,
        role: Option<Role>,
        is_active: Option<bool>,
        password: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        let email = email
            .filter(|raw| !raw.is_empty())
            .map(EmailAddress::parse)
            .transpose()?;
        let name = match name.filter(|raw| !raw.is_empty()).map(str::trim) {
            Some("") => return Err(UserValidationError::EmptyName),
            other => other.map(str::to_owned),
        };
        let password = match password.filter(|raw| !raw.is_empty()) {
            Some(raw) if raw.chars().count() < MIN_PASSWORD_LEN => {
                return Err(UserValidationError::PasswordTooShort {
                    min: MIN_PASSWORD_LEN,
                });
            }
            other => other.map(|raw| Zeroizing::new(raw.to_owned())),
        };
        Ok(Self {
            email,
            name,
            role,
            is_active,
            password,
        })
    }

    /// Requested email.
    #[must_use]
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Requested role.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// Requested activation flag.
    #[must_use]
    pub const fn is_active(&self) -> Option<bool> {
        self.is_active
    }

    /// Replacement password in plain text, zeroised on drop.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|password| password.as_str())
    }

    /// Swap the plain-text password for its hash.
    #[must_use]
    pub fn into_patch(self, password_hash: Option<String>) -> UserPatch {
        UserPatch {
            email: self.email,
            name: self.name,
            role: self.role,
            is_active: self.is_active,
            password_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("USER", Role::User)]
    #[case("ADMIN", Role::Admin)]
    fn roles_parse_from_wire_tags(#[case] tag: &str, #[case] expected: Role) {
        assert_eq!(tag.parse::<Role>(), Ok(expected));
        assert_eq!(expected.as_str(), tag);
    }

    #[rstest]
    #[case("admin")]
    #[case("SUPERUSER")]
    #[case("")]
    fn unknown_role_tags_are_rejected(#[case] tag: &str) {
        assert!(matches!(
            tag.parse::<Role>(),
            Err(UserValidationError::UnknownRole(_))
        ));
    }

    #[rstest]
    fn role_serialises_as_screaming_case() {
        let value = serde_json::to_value(Role::Admin).expect("serialise role");
        assert_eq!(value, serde_json::json!("ADMIN"));
    }

    #[rstest]
    #[case(-1)]
    #[case(0)]
    fn user_id_rejects_non_positive(#[case] raw: i32) {
        assert_eq!(UserId::new(raw), Err(UserValidationError::NonPositiveId(raw)));
    }

    #[rstest]
    #[case(" Ada@Example.COM ", Some("ada@example.com"))]
    #[case("no-at-sign", None)]
    #[case("@example.com", None)]
    #[case("ada@", None)]
    #[case("ada lovelace@example.com", None)]
    fn email_parsing(#[case] raw: &str, #[case] expected: Option<&str>) {
        let parsed = EmailAddress::parse(raw).ok();
        assert_eq!(parsed.as_ref().map(EmailAddress::as_str), expected);
    }

    #[rstest]
    fn new_user_request_defaults_role_and_trims_name() {
        let request = NewUserRequest::try_from_parts("ada@example.com", "  Ada ", "longenough", None)
            .expect("valid request");
        assert_eq!(request.role(), Role::User);
        assert_eq!(request.name(), "Ada");
        let account = request.into_account("hash".into());
        assert_eq!(account.email.as_str(), "ada@example.com");
    }

    #[rstest]
    #[case("ada@example.com", "Ada", "short", UserValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN })]
    #[case("ada@example.com", "  ", "longenough", UserValidationError::EmptyName)]
    fn new_user_request_rejects_bad_fields(
        #[case] email: &str,
        #[case] name: &str,
        #[case] password: &str,
        #[case] expected: UserValidationError,
    ) {
        let err = NewUserRequest::try_from_parts(email, name, password, Some(Role::Admin))
            .expect_err("invalid request");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn update_request_treats_empty_strings_as_absent() {
        let request = UserUpdateRequest::try_from_parts(Some(""), Some(""), None, Some(false), Some(""))
            .expect("valid update");
        assert!(request.email().is_none());
        assert!(request.password().is_none());
        let patch = request.into_patch(None);
        assert_eq!(patch.changed_fields(), vec!["isActive"]);
    }

    #[rstest]
    #[case(Some("nope"), None, None, UserValidationError::InvalidEmail("nope".into()))]
    #[case(None, Some("   "), None, UserValidationError::EmptyName)]
    #[case(None, None, Some("short"), UserValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN })]
    fn update_request_rejects_bad_fields(
        #[case] email: Option<&str>,
        #[case] name: Option<&str>,
        #[case] password: Option<&str>,
        #[case] expected: UserValidationError,
    ) {
        let err = UserUpdateRequest::try_from_parts(email, name, None, None, password)
            .expect_err("invalid update");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn patch_lists_changed_fields_without_values() {
        let request = UserUpdateRequest::try_from_parts(
            Some("Grace@Example.com"),
            Some(" Grace "),
            Some(Role::Admin),
            None,
            Some("correct horse"),
        )
        .expect("valid update");
        assert_eq!(request.password(), Some("correct horse"));
        let patch = request.into_patch(Some("hash".into()));
        assert_eq!(patch.name.as_deref(), Some("Grace"));
        assert_eq!(patch.email.as_ref().map(EmailAddress::as_str), Some("grace@example.com"));
        assert_eq!(patch.changed_fields(), vec!["email", "name", "role", "password"]);
        assert!(UserPatch::default().is_empty());
    }
}
