//! PostgreSQL-backed [`CustomerRepository`] adapter.
//!
//! Parcel links live in `customer_parcels`. Inserts and deletes touch both
//! tables inside one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{CustomerRepository, CustomerRepositoryError};
use crate::domain::{Customer, CustomerId, CustomerPatch, CustomerScope, NewCustomer, ParcelId};

use super::diesel_error_mapping::{foreign_key_violation, map_basic_diesel_error, map_pool_error};
use super::models::{CustomerChangeset, CustomerParcelRow, CustomerRow, NewCustomerRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::customer_from_row;
use super::schema::{customer_parcels, customers};

/// Diesel-backed customer store.
#[derive(Clone)]
pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> CustomerRepositoryError {
    map_pool_error(error, CustomerRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error, operation: &'static str) -> CustomerRepositoryError {
    map_basic_diesel_error(
        error,
        operation,
        CustomerRepositoryError::query,
        CustomerRepositoryError::connection,
    )
}

/// Parcel ids linked to each of `customer_ids`.
async fn load_links(
    conn: &mut AsyncPgConnection,
    customer_ids: &[i32],
) -> QueryResult<HashMap<i32, Vec<i32>>> {
    if customer_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<CustomerParcelRow> = customer_parcels::table
        .filter(customer_parcels::customer_id.eq_any(customer_ids))
        .select(CustomerParcelRow::as_select())
        .order_by(customer_parcels::parcel_id)
        .load(conn)
        .await?;
    let mut links: HashMap<i32, Vec<i32>> = HashMap::new();
    for row in rows {
        links.entry(row.customer_id).or_default().push(row.parcel_id);
    }
    Ok(links)
}

async fn with_links(
    conn: &mut AsyncPgConnection,
    row: CustomerRow,
) -> Result<Customer, CustomerRepositoryError> {
    let links = load_links(conn, &[row.id])
        .await
        .map_err(|err| diesel_error(err, "load customer parcels"))?;
    let parcel_ids = links.get(&row.id).map(Vec::as_slice).unwrap_or_default();
    customer_from_row(row, parcel_ids).map_err(CustomerRepositoryError::query)
}

#[async_trait]
impl CustomerRepository for DieselCustomerRepository {
    async fn list(
        &self,
        scope: CustomerScope,
        parcel: Option<ParcelId>,
    ) -> Result<Vec<Customer>, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let mut statement = customers::table
            .select(CustomerRow::as_select())
            .order_by((customers::created_at.desc(), customers::id.desc()))
            .into_boxed();
        if let CustomerScope::OwnedBy(owner) = scope {
            statement = statement.filter(customers::owner_id.eq(owner.get()));
        }
        if let Some(parcel) = parcel {
            let linked = customer_parcels::table
                .filter(customer_parcels::parcel_id.eq(parcel.get()))
                .select(customer_parcels::customer_id);
            statement = statement.filter(customers::id.eq_any(linked));
        }

        let rows: Vec<CustomerRow> = statement
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(err, "list customers"))?;
        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let links = load_links(&mut conn, &ids)
            .await
            .map_err(|err| diesel_error(err, "load customer parcels"))?;

        rows.into_iter()
            .map(|row| {
                let parcel_ids = links.get(&row.id).map(Vec::as_slice).unwrap_or_default();
                customer_from_row(row, parcel_ids).map_err(CustomerRepositoryError::query)
            })
            .collect()
    }

    async fn find(&self, id: CustomerId) -> Result<Option<Customer>, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = customers::table
            .find(id.get())
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| diesel_error(err, "find customer"))?;
        match row {
            Some(row) => with_links(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewCustomerRow {
            name: &customer.name,
            role: customer.role.as_str(),
            phone: customer.phone.as_deref(),
            email: customer.email.as_deref(),
            notes: customer.notes.as_deref(),
            owner_id: customer.owner_id.get(),
            created_at: customer.created_at,
            updated_at: customer.created_at,
        };
        let parcel_id = customer.parcel_id.map(ParcelId::get);

        let stored = conn
            .transaction(|conn| {
                async move {
                    let stored: CustomerRow = diesel::insert_into(customers::table)
                        .values(&row)
                        .returning(CustomerRow::as_returning())
                        .get_result(conn)
                        .await?;
                    if let Some(parcel_id) = parcel_id {
                        diesel::insert_into(customer_parcels::table)
                            .values(CustomerParcelRow {
                                customer_id: stored.id,
                                parcel_id,
                            })
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(stored)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match (foreign_key_violation(&err), parcel_id) {
                (Some(_), Some(parcel_id)) => CustomerRepositoryError::missing_parcel(parcel_id),
                _ => diesel_error(err, "insert customer"),
            })?;

        let parcel_ids: Vec<i32> = parcel_id.into_iter().collect();
        customer_from_row(stored, &parcel_ids).map_err(CustomerRepositoryError::query)
    }

    async fn update(
        &self,
        id: CustomerId,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = CustomerChangeset {
            name: patch.name.as_deref(),
            role: patch.role.map(|role| role.as_str()),
            phone: patch.phone.as_deref(),
            email: patch.email.as_deref(),
            notes: patch.notes.as_deref(),
            updated_at: Utc::now(),
        };
        let row = diesel::update(customers::table.find(id.get()))
            .set(&changes)
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| diesel_error(err, "update customer"))?;
        match row {
            Some(row) => with_links(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: CustomerId) -> Result<bool, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw = id.get();
        let removed = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(
                        customer_parcels::table.filter(customer_parcels::customer_id.eq(raw)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(customers::table.find(raw)).execute(conn).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| diesel_error(err, "delete customer"))?;
        Ok(removed > 0)
    }
}
