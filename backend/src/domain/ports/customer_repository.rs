//! Port for customer persistence.

use async_trait::async_trait;

use crate::domain::{
    Customer, CustomerId, CustomerPatch, CustomerScope, NewCustomer, ParcelId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by customer repository adapters.
    pub enum CustomerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => service_unavailable,
            "customer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => internal,
            "customer repository query failed: {message}",
        /// The linked parcel does not exist.
        MissingParcel { parcel_id: i32 } => not_found,
            "parcel {parcel_id} not found",
    }
}

/// Customer storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Customers inside `scope`, optionally linked to `parcel`, newest first.
    async fn list(
        &self,
        scope: CustomerScope,
        parcel: Option<ParcelId>,
    ) -> Result<Vec<Customer>, CustomerRepositoryError>;

    /// Look up one customer regardless of scope.
    async fn find(&self, id: CustomerId) -> Result<Option<Customer>, CustomerRepositoryError>;

    /// Store a customer and its optional parcel link together.
    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, CustomerRepositoryError>;

    /// Apply a partial update. `None` when the id is unknown.
    async fn update(
        &self,
        id: CustomerId,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, CustomerRepositoryError>;

    /// Delete a customer and its links. Returns whether a row was removed.
    async fn delete(&self, id: CustomerId) -> Result<bool, CustomerRepositoryError>;
}
