//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer. Conversions into domain
//! types validate tags and ids so a corrupt row surfaces as a query error
//! rather than a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{audit_logs, customer_parcels, customers, notifications, parcels, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable account.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial account update; `None` columns are left alone.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub email: Option<&'a str>,
    pub name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub is_active: Option<bool>,
    pub password_hash: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Row read from `notifications`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: i32,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub related_id: Option<i32>,
    pub related_type: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable notification.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub kind: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub related_id: Option<i32>,
    pub related_type: Option<&'a str>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Audit logs
// ---------------------------------------------------------------------------

/// Row read from `audit_logs`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuditLogRow {
    pub id: i32,
    pub user_id: Option<i32>,
    pub action: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Actor columns joined from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuditActorRow {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Insertable audit entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_logs)]
pub(crate) struct NewAuditLogRow<'a> {
    pub user_id: Option<i32>,
    pub action: &'a str,
    pub resource: &'a str,
    pub resource_id: Option<&'a str>,
    pub details: Option<&'a serde_json::Value>,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Parcels
// ---------------------------------------------------------------------------

/// Row read from `parcels`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = parcels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ParcelRow {
    pub id: i32,
    pub city: String,
    pub district: String,
    pub neighborhood: String,
    pub island: String,
    pub parsel: String,
    pub area: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub category: String,
    pub crm_stage: String,
    pub tags: Option<String>,
    pub owner_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable parcel.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parcels)]
pub(crate) struct NewParcelRow<'a> {
    pub city: &'a str,
    pub district: &'a str,
    pub neighborhood: &'a str,
    pub island: &'a str,
    pub parsel: &'a str,
    pub area: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: &'a str,
    pub category: &'a str,
    pub crm_stage: &'a str,
    pub tags: Option<&'a str>,
    pub owner_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

/// Row read from `customers`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomerRow {
    pub id: i32,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Insertable customer.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customers)]
pub(crate) struct NewCustomerRow<'a> {
    pub name: &'a str,
    pub role: &'a str,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial customer update; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = customers)]
pub(crate) struct CustomerChangeset<'a> {
    pub name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Customer-parcel link.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = customer_parcels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomerParcelRow {
    pub customer_id: i32,
    pub parcel_id: i32,
}
