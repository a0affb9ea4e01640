//! Credential primitives: validated login input and bcrypt helpers.

use tracing::warn;
use zeroize::Zeroizing;

use super::{EmailAddress, Error, MIN_PASSWORD_LEN};

/// bcrypt work factor used for newly created accounts.
pub const PASSWORD_HASH_COST: u32 = 10;

/// Reasons a login payload is rejected before any lookup happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email lacks a plausible shape.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased, and contains an `@`.
/// - `password` is non-empty and kept verbatim in zeroizing memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    ///
    /// # Examples
    /// ```
    /// use parcel_backend::domain::LoginCredentials;
    ///
    /// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "secret")
    ///     .expect("valid credentials");
    /// assert_eq!(creds.email(), "ada@example.com");
    /// ```
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        if email.trim().is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        let email = EmailAddress::parse(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for account lookup.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Reasons a password change is rejected before the stored hash is read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordChangeValidationError {
    /// Current password was blank.
    #[error("current password must not be empty")]
    EmptyCurrentPassword,
    /// Replacement is shorter than the account minimum.
    #[error("new password must be at least {min} characters")]
    NewPasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

/// Self-service password change: the password the caller proves and the
/// one replacing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current: Zeroizing<String>,
    replacement: Zeroizing<String>,
}

impl PasswordChange {
    /// Validate raw inputs.
    ///
    /// # Examples
    /// ```
    /// use parcel_backend::domain::PasswordChange;
    ///
    /// assert!(PasswordChange::try_from_parts("old secret", "new secret").is_ok());
    /// assert!(PasswordChange::try_from_parts("old secret", "short").is_err());
    /// ```
    pub fn try_from_parts(
        current: &str,
        replacement: &str,
    ) -> Result<Self, PasswordChangeValidationError> {
        if current.is_empty() {
            return Err(PasswordChangeValidationError::EmptyCurrentPassword);
        }
        if replacement.chars().count() < MIN_PASSWORD_LEN {
            return Err(PasswordChangeValidationError::NewPasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(Self {
            current: Zeroizing::new(current.to_owned()),
            replacement: Zeroizing::new(replacement.to_owned()),
        })
    }

    /// Password the caller claims to hold.
    #[must_use]
    pub fn current(&self) -> &str {
        self.current.as_str()
    }

    /// Password to store.
    #[must_use]
    pub fn replacement(&self) -> &str {
        self.replacement.as_str()
    }
}

/// Hash a plaintext password for storage.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, Error> {
    bcrypt::hash(plain, cost).map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

/// Compare a plaintext password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a mismatch.
#[must_use]
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match bcrypt::verify(plain, hash) {
        Ok(matches) => matches,
        Err(error) => {
            warn!(%error, "stored password hash could not be verified");
            false
        }
    }
}
