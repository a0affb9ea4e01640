//! Audit trail entities and query filters.
//!
//! Entries are append-only. Queries return newest first and are always
//! bounded by a limit so a single request cannot scan the whole table.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::UserId;

/// Default number of rows returned by the filtered audit view.
pub const DEFAULT_AUDIT_LIMIT: u32 = 100;
/// Default number of rows returned by the security view.
pub const DEFAULT_SECURITY_LIMIT: u32 = 50;
/// Hard upper bound for any audit query.
pub const MAX_AUDIT_LIMIT: u32 = 1000;

/// Failures parsing audit inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditValidationError {
    /// Action tag outside the known set.
    #[error("unknown audit action '{0}'")]
    UnknownAction(String),
    /// Status tag outside the known set.
    #[error("unknown audit status '{0}'")]
    UnknownStatus(String),
    /// Resource names must not be blank.
    #[error("resource must not be empty")]
    EmptyResource,
    /// `start` is after `end`.
    #[error("start date must not be after end date")]
    InvertedRange,
}

macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored and wire tag.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $tag, )+
                }
            }
        }

        impl FromStr for $name {
            type Err = AuditValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $tag => Ok(Self::$variant), )+
                    other => Err(AuditValidationError::$err(other.to_owned())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

tagged_enum! {
    /// Kinds of audited events.
    AuditAction, UnknownAction {
        /// Successful sign-in.
        Login => "LOGIN",
        /// Sign-out.
        Logout => "LOGOUT",
        /// Rejected sign-in attempt.
        FailedLogin => "FAILED_LOGIN",
        /// Password change.
        PasswordChange => "PASSWORD_CHANGE",
        /// Record created.
        Create => "CREATE",
        /// Record updated.
        Update => "UPDATE",
        /// Record deleted.
        Delete => "DELETE",
        /// Data exported.
        Export => "EXPORT",
        /// Sensitive record viewed.
        View => "VIEW",
        /// Request throttled.
        RateLimited => "RATE_LIMITED",
        /// Client address blocked.
        IpBlocked => "IP_BLOCKED",
    }
}

impl AuditAction {
    /// Actions surfaced by the security view.
    pub const SECURITY: &'static [Self] = &[Self::FailedLogin, Self::RateLimited, Self::IpBlocked];

    /// Whether this action belongs to the security view.
    #[must_use]
    pub fn is_security(self) -> bool {
        Self::SECURITY.contains(&self)
    }
}

tagged_enum! {
    /// Outcome of an audited event.
    AuditStatus, UnknownStatus {
        /// Operation succeeded.
        Success => "SUCCESS",
        /// Operation failed.
        Failure => "FAILURE",
        /// Operation was refused by policy.
        Blocked => "BLOCKED",
    }
}

/// Client metadata attached to audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    /// Originating client address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}

/// Audited resource name, e.g. `parcels`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuditResource(String);

impl AuditResource {
    /// Resource name used for sign-in events.
    pub const AUTH: &'static str = "auth";
    /// Resource name for account management.
    pub const USERS: &'static str = "users";
    /// Resource name for parcel records.
    pub const PARCELS: &'static str = "parcels";
    /// Resource name for CRM contacts.
    pub const CUSTOMERS: &'static str = "customers";

    /// Validate a resource name.
    pub fn new(raw: &str) -> Result<Self, AuditValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AuditValidationError::EmptyResource);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn known(name: &'static str) -> Self {
        Self(name.to_owned())
    }
}

/// Projection of the acting user joined onto an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditActor {
    /// Account id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
}

/// Stored audit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    /// Primary key.
    pub id: i32,
    /// Acting user, when known.
    pub actor: Option<AuditActor>,
    /// Raw actor id, retained even if the account was removed.
    pub user_id: Option<UserId>,
    /// Event kind.
    pub action: AuditAction,
    /// Affected resource name.
    pub resource: AuditResource,
    /// Affected record id.
    pub resource_id: Option<String>,
    /// Structured context.
    pub details: Option<Value>,
    /// Client address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Outcome.
    pub status: AuditStatus,
    /// Event time.
    pub created_at: DateTime<Utc>,
}

/// Entry to append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLogEntry {
    /// Acting user.
    pub user_id: Option<UserId>,
    /// Event kind.
    pub action: AuditAction,
    /// Affected resource name.
    pub resource: AuditResource,
    /// Affected record id.
    pub resource_id: Option<String>,
    /// Structured context.
    pub details: Option<Value>,
    /// Client metadata.
    pub metadata: RequestMetadata,
    /// Outcome.
    pub status: AuditStatus,
}

impl NewAuditLogEntry {
    /// Successful event against a known resource.
    #[must_use]
    pub fn success(
        user_id: Option<UserId>,
        action: AuditAction,
        resource: &'static str,
        metadata: RequestMetadata,
    ) -> Self {
        Self {
            user_id,
            action,
            resource: AuditResource::known(resource),
            resource_id: None,
            details: None,
            metadata,
            status: AuditStatus::Success,
        }
    }

    /// Attach the affected record id.
    #[must_use]
    pub fn with_resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    /// Attach structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Override the outcome.
    #[must_use]
    pub fn with_status(mut self, status: AuditStatus) -> Self {
        self.status = status;
        self
    }
}

/// Bounded row count for audit queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditLimit(u32);

impl AuditLimit {
    /// Clamp a requested limit to at most `MAX_AUDIT_LIMIT`. A missing or
    /// zero request falls back to `default`.
    ///
    /// # Examples
    /// ```
    /// use parcel_backend::domain::{AuditLimit, DEFAULT_AUDIT_LIMIT, MAX_AUDIT_LIMIT};
    ///
    /// assert_eq!(AuditLimit::clamped(None, DEFAULT_AUDIT_LIMIT).get(), 100);
    /// assert_eq!(AuditLimit::clamped(Some(0), DEFAULT_AUDIT_LIMIT).get(), 100);
    /// assert_eq!(AuditLimit::clamped(Some(5000), DEFAULT_AUDIT_LIMIT).get(), MAX_AUDIT_LIMIT);
    /// ```
    #[must_use]
    pub fn clamped(requested: Option<u32>, default: u32) -> Self {
        let limit = requested.filter(|&n| n > 0).unwrap_or(default);
        Self(limit.clamp(1, MAX_AUDIT_LIMIT))
    }

    /// Row count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for AuditLimit {
    fn default() -> Self {
        Self(DEFAULT_AUDIT_LIMIT)
    }
}

/// Query-time projection over the audit log. Absent fields impose no
/// constraint; `actions` matches any of its members when non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditLogFilter {
    /// Restrict to one actor.
    pub user_id: Option<UserId>,
    /// Restrict to these actions.
    pub actions: Vec<AuditAction>,
    /// Restrict to one resource.
    pub resource: Option<AuditResource>,
    /// Inclusive lower bound on `created_at`.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end: Option<DateTime<Utc>>,
    /// Row cap.
    pub limit: AuditLimit,
}

impl AuditLogFilter {
    /// Filter selecting only security-relevant actions.
    #[must_use]
    pub fn security(limit: AuditLimit) -> Self {
        Self {
            actions: AuditAction::SECURITY.to_vec(),
            limit,
            ..Self::default()
        }
    }

    /// Reject inverted date ranges.
    pub fn validate(&self) -> Result<(), AuditValidationError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(AuditValidationError::InvertedRange),
            _ => Ok(()),
        }
    }
}
