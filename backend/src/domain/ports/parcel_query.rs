//! Driving ports for parcel use-cases.

use async_trait::async_trait;

use crate::domain::{
    CrmStage, Error, Identity, Parcel, ParcelDraft, ParcelId, ParcelListFilter, RequestMetadata,
};

/// Parcel read use-cases, scoped to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParcelQuery: Send + Sync {
    /// Parcels visible to `identity`.
    async fn list_parcels(
        &self,
        identity: Identity,
        filter: ParcelListFilter,
    ) -> Result<Vec<Parcel>, Error>;

    /// One parcel; invisible parcels are reported as not found.
    async fn get_parcel(&self, identity: Identity, id: ParcelId) -> Result<Parcel, Error>;
}

/// Parcel write use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParcelCommand: Send + Sync {
    /// Create a parcel owned by `identity`.
    async fn create_parcel(
        &self,
        identity: Identity,
        draft: ParcelDraft,
        metadata: &RequestMetadata,
    ) -> Result<Parcel, Error>;

    /// Change the CRM stage of a visible parcel.
    async fn update_crm_stage(
        &self,
        identity: Identity,
        id: ParcelId,
        stage: CrmStage,
        metadata: &RequestMetadata,
    ) -> Result<Parcel, Error>;
}
