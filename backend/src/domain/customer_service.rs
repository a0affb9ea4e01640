//! Customer (CRM contact) use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::access::ensure_owner_or_admin;
use crate::domain::ports::{AuditRecorder, CustomerCommand, CustomerQuery, CustomerRepository};
use crate::domain::{
    AuditAction, AuditResource, Customer, CustomerDraft, CustomerId, CustomerPatch,
    CustomerPatchDraft, CustomerScope, Error, Identity, NewAuditLogEntry, NewCustomer, ParcelId,
    RequestMetadata, Role,
};

fn not_found(id: CustomerId) -> Error {
    Error::not_found(format!("customer {id} not found"))
}

/// Service implementing the customer query and command ports.
#[derive(Clone)]
pub struct CustomerService<R> {
    repo: Arc<R>,
    audit: Arc<dyn AuditRecorder>,
    clock: Arc<dyn Clock>,
}

impl<R> CustomerService<R> {
    /// Create a service over `repo`.
    pub fn new(repo: Arc<R>, audit: Arc<dyn AuditRecorder>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, audit, clock }
    }
}

impl<R> CustomerService<R>
where
    R: CustomerRepository,
{
    async fn owned(&self, identity: &Identity, id: CustomerId) -> Result<Customer, Error> {
        let customer = self.repo.find(id).await?.ok_or_else(|| not_found(id))?;
        ensure_owner_or_admin(identity, customer.owner_id)?;
        Ok(customer)
    }

    async fn audit(
        &self,
        identity: &Identity,
        action: AuditAction,
        id: CustomerId,
        metadata: &RequestMetadata,
        details: serde_json::Value,
    ) {
        self.audit
            .record(
                NewAuditLogEntry::success(
                    Some(identity.user_id),
                    action,
                    AuditResource::CUSTOMERS,
                    metadata.clone(),
                )
                .with_resource_id(id)
                .with_details(details),
            )
            .await;
    }
}

#[async_trait]
impl<R> CustomerQuery for CustomerService<R>
where
    R: CustomerRepository,
{
    async fn list_customers(
        &self,
        identity: Identity,
        parcel: Option<ParcelId>,
    ) -> Result<Vec<Customer>, Error> {
        let scope = match identity.role {
            Role::Admin => CustomerScope::All,
            Role::User => CustomerScope::OwnedBy(identity.user_id),
        };
        Ok(self.repo.list(scope, parcel).await?)
    }

    async fn get_customer(&self, identity: Identity, id: CustomerId) -> Result<Customer, Error> {
        self.owned(&identity, id).await
    }
}

#[async_trait]
impl<R> CustomerCommand for CustomerService<R>
where
    R: CustomerRepository,
{
    async fn create_customer(
        &self,
        identity: Identity,
        draft: CustomerDraft,
        metadata: &RequestMetadata,
    ) -> Result<Customer, Error> {
        let customer = NewCustomer::from_draft(draft, identity.user_id, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let created = self.repo.insert(&customer).await?;
        self.audit(
            &identity,
            AuditAction::Create,
            created.id,
            metadata,
            json!({ "name": created.name, "role": created.role.as_str() }),
        )
        .await;
        info!(customer_id = %created.id, owner = %identity.user_id, "customer created");
        Ok(created)
    }

    async fn update_customer(
        &self,
        identity: Identity,
        id: CustomerId,
        patch: CustomerPatchDraft,
        metadata: &RequestMetadata,
    ) -> Result<Customer, Error> {
        let patch =
            CustomerPatch::try_from(patch).map_err(|err| Error::invalid_request(err.to_string()))?;
        let current = self.owned(&identity, id).await?;
        if patch.is_empty() {
            return Ok(current);
        }
        let updated = self
            .repo
            .update(id, &patch)
            .await?
            .ok_or_else(|| not_found(id))?;
        self.audit(
            &identity,
            AuditAction::Update,
            id,
            metadata,
            json!({ "name": updated.name }),
        )
        .await;
        Ok(updated)
    }

    async fn delete_customer(
        &self,
        identity: Identity,
        id: CustomerId,
        metadata: &RequestMetadata,
    ) -> Result<(), Error> {
        let current = self.owned(&identity, id).await?;
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        self.audit(
            &identity,
            AuditAction::Delete,
            id,
            metadata,
            json!({ "name": current.name }),
        )
        .await;
        info!(customer_id = %id, by = %identity.user_id, "customer deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "customer_service_tests.rs"]
mod tests;
