//! Domain primitives, services, and ports.
//!
//! Purpose: define strongly typed entities for the dashboard (accounts,
//! notifications, audit entries, parcels, customers), the use-case services
//! operating on them, and the ports adapters implement. Nothing here knows
//! about HTTP or SQL.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failure payload.
//! - [`Identity`] and [`Role`]: who the caller is, as resolved by the
//!   [`ports::SessionResolver`].
//! - [`require_authenticated`], [`require_admin`], [`is_admin_role`]: the
//!   access gate every protected use-case passes first.

pub mod access;
pub mod analysis;
pub mod analysis_service;
pub mod audit;
pub mod audit_service;
pub mod auth;
pub mod customer_service;
pub mod customers;
pub mod error;
pub mod login_service;
pub mod notification_service;
pub mod notifications;
pub mod parcel_service;
pub mod parcels;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_admin_service;

pub use self::access::{
    FORBIDDEN_MESSAGE, UNAUTHORIZED_MESSAGE, ensure_owner_or_admin, is_admin_role, require_admin,
    require_authenticated,
};
pub use self::analysis::{ANALYSIS_UNREACHABLE_MESSAGE, AnalysisPath, AnalysisPathError};
pub use self::analysis_service::AnalysisProxyService;
pub use self::audit::{
    AuditAction, AuditActor, AuditLimit, AuditLogEntry, AuditLogFilter, AuditResource,
    AuditStatus, AuditValidationError, DEFAULT_AUDIT_LIMIT, DEFAULT_SECURITY_LIMIT,
    MAX_AUDIT_LIMIT, NewAuditLogEntry, RequestMetadata,
};
pub use self::audit_service::AuditService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_HASH_COST, PasswordChange,
    PasswordChangeValidationError,
};
pub use self::customer_service::CustomerService;
pub use self::customers::{
    Customer, CustomerDraft, CustomerId, CustomerPatch, CustomerPatchDraft, CustomerRole,
    CustomerScope, CustomerValidationError, NewCustomer,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::login_service::PasswordLoginService;
pub use self::notification_service::NotificationService;
pub use self::notifications::{
    DEFAULT_FEED_LIMIT, MAX_FEED_LIMIT, NewNotification, NewNotificationDraft, Notification,
    NotificationFeed, NotificationId, NotificationListQuery, NotificationValidationError,
    RelatedEntity,
};
pub use self::parcel_service::ParcelService;
pub use self::parcels::{
    CrmStage, NewParcel, Parcel, ParcelCategory, ParcelDraft, ParcelId, ParcelListFilter,
    ParcelScope, ParcelStatus, ParcelValidationError,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, Identity, MIN_PASSWORD_LEN, NewUserAccount, NewUserRequest, Role, UserAccount,
    UserId, UserPatch, UserUpdateRequest, UserValidationError,
};
pub use self::user_admin_service::UserAdminService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use parcel_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
