//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`AnalysisBackend`], [`SessionResolver`]) are
//! implemented by outbound adapters. Driving ports (`*Query`, `*Command`,
//! [`LoginService`], [`UserAdministration`], [`AnalysisProxy`]) are
//! implemented by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod analysis_backend;
mod audit_log_query;
mod audit_log_repository;
mod customer_query;
mod customer_repository;
mod login_service;
mod notification_command;
mod notification_query;
mod notification_repository;
mod parcel_query;
mod parcel_repository;
mod session_resolver;
mod user_administration;
mod user_repository;

#[cfg(test)]
pub use analysis_backend::{MockAnalysisBackend, MockAnalysisProxy};
pub use analysis_backend::{AnalysisBackend, AnalysisBackendError, AnalysisProxy};
#[cfg(test)]
pub use audit_log_query::{MockAuditLogQuery, MockAuditRecorder};
pub use audit_log_query::{AuditLogQuery, AuditRecorder, NoOpAuditRecorder};
#[cfg(test)]
pub use audit_log_repository::MockAuditLogRepository;
pub use audit_log_repository::{
    AuditLogRepository, AuditLogRepositoryError, FixtureAuditLogRepository,
};
#[cfg(test)]
pub use customer_query::{MockCustomerCommand, MockCustomerQuery};
pub use customer_query::{CustomerCommand, CustomerQuery};
#[cfg(test)]
pub use customer_repository::MockCustomerRepository;
pub use customer_repository::{CustomerRepository, CustomerRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use notification_command::MockNotificationCommand;
pub use notification_command::NotificationCommand;
#[cfg(test)]
pub use notification_query::MockNotificationQuery;
pub use notification_query::{FixtureNotificationQuery, NotificationQuery};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use parcel_query::{MockParcelCommand, MockParcelQuery};
pub use parcel_query::{ParcelCommand, ParcelQuery};
#[cfg(test)]
pub use parcel_repository::MockParcelRepository;
pub use parcel_repository::{ParcelRepository, ParcelRepositoryError};
#[cfg(test)]
pub use session_resolver::MockSessionResolver;
pub use session_resolver::{FixedSessionResolver, SessionResolver};
#[cfg(test)]
pub use user_administration::MockUserAdministration;
pub use user_administration::UserAdministration;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
