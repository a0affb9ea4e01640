//! PostgreSQL-backed [`ParcelRepository`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ParcelRepository, ParcelRepositoryError};
use crate::domain::{CrmStage, NewParcel, Parcel, ParcelId, ParcelListFilter, ParcelScope};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error, unique_violation};
use super::models::{NewParcelRow, ParcelRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{collect_rows, parcel_from_row};
use super::schema::parcels;

/// Diesel-backed parcel store.
#[derive(Clone)]
pub struct DieselParcelRepository {
    pool: DbPool,
}

impl DieselParcelRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ParcelRepositoryError {
    map_pool_error(error, ParcelRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error, operation: &'static str) -> ParcelRepositoryError {
    map_basic_diesel_error(
        error,
        operation,
        ParcelRepositoryError::query,
        ParcelRepositoryError::connection,
    )
}

fn convert(row: ParcelRow) -> Result<Parcel, ParcelRepositoryError> {
    parcel_from_row(row).map_err(ParcelRepositoryError::query)
}

#[async_trait]
impl ParcelRepository for DieselParcelRepository {
    async fn list(
        &self,
        scope: ParcelScope,
        filter: &ParcelListFilter,
    ) -> Result<Vec<Parcel>, ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let mut statement = parcels::table
            .select(ParcelRow::as_select())
            .order_by((parcels::created_at.desc(), parcels::id.desc()))
            .into_boxed();

        if let ParcelScope::OwnedOrAssigned(user) = scope {
            let raw = user.get();
            statement =
                statement.filter(parcels::owner_id.eq(raw).or(parcels::assigned_to.eq(raw)));
        }
        if let Some(island) = &filter.island {
            statement = statement.filter(parcels::island.eq(island.clone()));
        }
        if let Some(parsel) = &filter.parsel {
            statement = statement.filter(parcels::parsel.eq(parsel.clone()));
        }
        if let Some(category) = filter.category {
            statement = statement.filter(parcels::category.eq(category.as_str()));
        }

        let rows: Vec<ParcelRow> = statement
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "list parcels"))?;
        collect_rows(rows.into_iter().map(parcel_from_row), ParcelRepositoryError::query)
    }

    async fn find(&self, id: ParcelId) -> Result<Option<Parcel>, ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = parcels::table
            .find(id.get())
            .select(ParcelRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| diesel_error(err, "find parcel"))?;
        row.map(convert).transpose()
    }

    async fn insert(&self, parcel: &NewParcel) -> Result<Parcel, ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewParcelRow {
            city: &parcel.city,
            district: &parcel.district,
            neighborhood: &parcel.neighborhood,
            island: &parcel.island,
            parsel: &parcel.parsel,
            area: parcel.area,
            latitude: parcel.latitude,
            longitude: parcel.longitude,
            status: parcel.status.as_str(),
            category: parcel.category.as_str(),
            crm_stage: parcel.crm_stage.as_str(),
            tags: parcel.tags.as_deref(),
            owner_id: Some(parcel.owner_id.get()),
            created_at: parcel.created_at,
            updated_at: parcel.created_at,
        };
        let stored = diesel::insert_into(parcels::table)
            .values(&row)
            .returning(ParcelRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if unique_violation(&err).is_some() {
                    ParcelRepositoryError::duplicate(format!("{}/{}", parcel.island, parcel.parsel))
                } else {
                    diesel_error(err, "insert parcel")
                }
            })?;
        convert(stored)
    }

    async fn update_crm_stage(
        &self,
        id: ParcelId,
        stage: CrmStage,
        at: DateTime<Utc>,
    ) -> Result<Option<Parcel>, ParcelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::update(parcels::table.find(id.get()))
            .set((parcels::crm_stage.eq(stage.as_str()), parcels::updated_at.eq(at)))
            .returning(ParcelRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| diesel_error(err, "update parcel stage"))?;
        row.map(convert).transpose()
    }
}
