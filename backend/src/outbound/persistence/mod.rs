//! PostgreSQL persistence adapters.
//!
//! Each adapter implements one driven port from `domain::ports` on top of
//! `diesel-async` and a shared `bb8` pool. Row structs and the table
//! definitions stay private to this module; only adapters, the pool, and the
//! migration runner are exported.
//!
//! ```ignore
//! use parcel_backend::outbound::persistence::{DbPool, DieselParcelRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/parcels")).await?;
//! let parcels = DieselParcelRepository::new(pool);
//! ```

mod diesel_audit_log_repository;
mod diesel_customer_repository;
mod diesel_error_mapping;
mod diesel_notification_repository;
mod diesel_parcel_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod row_conversions;
mod schema;

pub use diesel_audit_log_repository::DieselAuditLogRepository;
pub use diesel_customer_repository::DieselCustomerRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_parcel_repository::DieselParcelRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_POOL_MAX_SIZE, DbPool, PoolConfig, PoolError};
