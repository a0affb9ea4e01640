//! Parcel use-cases scoped by role.
//!
//! Admins see every parcel. Regular users see parcels they own or are
//! assigned to; anything else is reported as missing rather than forbidden
//! so parcel ids do not leak.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{AuditRecorder, ParcelCommand, ParcelQuery, ParcelRepository};
use crate::domain::{
    AuditAction, AuditResource, CrmStage, Error, Identity, NewAuditLogEntry, NewParcel, Parcel,
    ParcelDraft, ParcelId, ParcelListFilter, ParcelScope, RequestMetadata,
};

fn not_found(id: ParcelId) -> Error {
    Error::not_found(format!("parcel {id} not found"))
}

/// Service implementing the parcel query and command ports.
#[derive(Clone)]
pub struct ParcelService<R> {
    repo: Arc<R>,
    audit: Arc<dyn AuditRecorder>,
    clock: Arc<dyn Clock>,
}

impl<R> ParcelService<R> {
    /// Create a service over `repo`.
    pub fn new(repo: Arc<R>, audit: Arc<dyn AuditRecorder>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, audit, clock }
    }
}

impl<R> ParcelService<R>
where
    R: ParcelRepository,
{
    async fn visible(&self, identity: &Identity, id: ParcelId) -> Result<Parcel, Error> {
        self.repo
            .find(id)
            .await?
            .filter(|parcel| parcel.is_visible_to(identity))
            .ok_or_else(|| not_found(id))
    }
}

#[async_trait]
impl<R> ParcelQuery for ParcelService<R>
where
    R: ParcelRepository,
{
    async fn list_parcels(
        &self,
        identity: Identity,
        filter: ParcelListFilter,
    ) -> Result<Vec<Parcel>, Error> {
        Ok(self
            .repo
            .list(ParcelScope::for_identity(&identity), &filter)
            .await?)
    }

    async fn get_parcel(&self, identity: Identity, id: ParcelId) -> Result<Parcel, Error> {
        self.visible(&identity, id).await
    }
}

#[async_trait]
impl<R> ParcelCommand for ParcelService<R>
where
    R: ParcelRepository,
{
    async fn create_parcel(
        &self,
        identity: Identity,
        draft: ParcelDraft,
        metadata: &RequestMetadata,
    ) -> Result<Parcel, Error> {
        let parcel = NewParcel::from_draft(draft, identity.user_id, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let created = self.repo.insert(&parcel).await?;

        self.audit
            .record(
                NewAuditLogEntry::success(
                    Some(identity.user_id),
                    AuditAction::Create,
                    AuditResource::PARCELS,
                    metadata.clone(),
                )
                .with_resource_id(created.id)
                .with_details(json!({
                    "island": created.island,
                    "parsel": created.parsel,
                })),
            )
            .await;
        info!(parcel_id = %created.id, owner = %identity.user_id, "parcel created");
        Ok(created)
    }

    async fn update_crm_stage(
        &self,
        identity: Identity,
        id: ParcelId,
        stage: CrmStage,
        metadata: &RequestMetadata,
    ) -> Result<Parcel, Error> {
        let previous = self.visible(&identity, id).await?;
        let updated = self
            .repo
            .update_crm_stage(id, stage, self.clock.utc())
            .await?
            .ok_or_else(|| not_found(id))?;

        self.audit
            .record(
                NewAuditLogEntry::success(
                    Some(identity.user_id),
                    AuditAction::Update,
                    AuditResource::PARCELS,
                    metadata.clone(),
                )
                .with_resource_id(id)
                .with_details(json!({
                    "from": previous.crm_stage.as_str(),
                    "to": stage.as_str(),
                })),
            )
            .await;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "parcel_service_tests.rs"]
mod tests;
