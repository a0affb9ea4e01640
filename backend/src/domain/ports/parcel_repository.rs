//! Port for parcel persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CrmStage, NewParcel, Parcel, ParcelId, ParcelListFilter, ParcelScope};

use super::define_port_error;

define_port_error! {
    /// Errors raised by parcel repository adapters.
    pub enum ParcelRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => service_unavailable,
            "parcel repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => internal,
            "parcel repository query failed: {message}",
        /// A parcel with the same location key already exists.
        Duplicate { key: String } => conflict,
            "parcel {key} already exists",
    }
}

/// Parcel storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParcelRepository: Send + Sync {
    /// Parcels inside `scope` matching `filter`, newest first.
    async fn list(
        &self,
        scope: ParcelScope,
        filter: &ParcelListFilter,
    ) -> Result<Vec<Parcel>, ParcelRepositoryError>;

    /// Look up one parcel regardless of scope.
    async fn find(&self, id: ParcelId) -> Result<Option<Parcel>, ParcelRepositoryError>;

    /// Store a new parcel.
    async fn insert(&self, parcel: &NewParcel) -> Result<Parcel, ParcelRepositoryError>;

    /// Move a parcel along the CRM pipeline. `None` when the id is unknown.
    async fn update_crm_stage(
        &self,
        id: ParcelId,
        stage: CrmStage,
        at: DateTime<Utc>,
    ) -> Result<Option<Parcel>, ParcelRepositoryError>;
}
