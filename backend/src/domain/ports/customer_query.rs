//! Driving ports for customer use-cases.
//!
//! Listings are scoped to the caller. Single-record operations report a
//! missing customer as not found and someone else's customer as forbidden.

use async_trait::async_trait;

use crate::domain::{
    Customer, CustomerDraft, CustomerId, CustomerPatchDraft, Error, Identity, ParcelId,
    RequestMetadata,
};

/// Customer read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerQuery: Send + Sync {
    /// Customers visible to `identity`, optionally linked to one parcel.
    async fn list_customers(
        &self,
        identity: Identity,
        parcel: Option<ParcelId>,
    ) -> Result<Vec<Customer>, Error>;

    /// One visible customer.
    async fn get_customer(&self, identity: Identity, id: CustomerId) -> Result<Customer, Error>;
}

/// Customer write use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerCommand: Send + Sync {
    /// Create a customer owned by `identity`.
    async fn create_customer(
        &self,
        identity: Identity,
        draft: CustomerDraft,
        metadata: &RequestMetadata,
    ) -> Result<Customer, Error>;

    /// Patch a visible customer.
    async fn update_customer(
        &self,
        identity: Identity,
        id: CustomerId,
        patch: CustomerPatchDraft,
        metadata: &RequestMetadata,
    ) -> Result<Customer, Error>;

    /// Delete a visible customer.
    async fn delete_customer(
        &self,
        identity: Identity,
        id: CustomerId,
        metadata: &RequestMetadata,
    ) -> Result<(), Error>;
}
