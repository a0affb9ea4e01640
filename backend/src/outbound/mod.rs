//! Outbound adapters implementing driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel
//! - **analysis**: HTTP client for the internal analysis service
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business rules.

pub mod analysis;
pub mod persistence;
