//! Row-to-domain converters.
//!
//! Stored tags and ids are re-validated on the way out. A row that no longer
//! parses becomes a `String` error that each adapter wraps in its port's
//! `Query` variant.

use crate::domain::{
    AuditActor, AuditLogEntry, AuditResource, Customer, CustomerId, Notification, NotificationId,
    Parcel, ParcelId, RelatedEntity, UserAccount, UserId,
};

use super::models::{
    AuditActorRow, AuditLogRow, CustomerRow, NotificationRow, ParcelRow, UserRow,
};

/// Collect converted rows, stopping at the first failure.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

fn user_id(raw: i32) -> Result<UserId, String> {
    UserId::new(raw).map_err(|err| err.to_string())
}

fn optional_user_id(raw: Option<i32>) -> Result<Option<UserId>, String> {
    raw.map(user_id).transpose()
}

pub(crate) fn user_from_row(row: UserRow) -> Result<UserAccount, String> {
    Ok(UserAccount {
        id: user_id(row.id)?,
        email: row.email,
        name: row.name,
        role: row.role.parse().map_err(|err: crate::domain::UserValidationError| err.to_string())?,
        is_active: row.is_active,
        password_hash: row.password_hash,
        last_login: row.last_login,
        created_at: row.created_at,
    })
}

pub(crate) fn notification_from_row(row: NotificationRow) -> Result<Notification, String> {
    let related = match (row.related_id, row.related_type) {
        (Some(id), Some(kind)) => Some(RelatedEntity { id, kind }),
        (None, None) => None,
        _ => return Err(format!("notification {} has a partial relation", row.id)),
    };
    Ok(Notification {
        id: NotificationId::new(row.id).map_err(|err| err.to_string())?,
        kind: row.kind,
        title: row.title,
        message: row.message,
        related,
        is_read: row.is_read,
        created_at: row.created_at,
    })
}

pub(crate) fn audit_entry_from_rows(
    (row, actor): (AuditLogRow, Option<AuditActorRow>),
) -> Result<AuditLogEntry, String> {
    let actor = actor
        .map(|actor| -> Result<AuditActor, String> {
            Ok(AuditActor {
                id: user_id(actor.id)?,
                name: actor.name,
                email: actor.email,
            })
        })
        .transpose()?;
    Ok(AuditLogEntry {
        id: row.id,
        actor,
        user_id: optional_user_id(row.user_id)?,
        action: row.action.parse().map_err(|err: crate::domain::AuditValidationError| err.to_string())?,
        resource: AuditResource::new(&row.resource).map_err(|err| err.to_string())?,
        resource_id: row.resource_id,
        details: row.details,
        ip_address: row.ip_address,
        user_agent: row.user_agent,
        status: row.status.parse().map_err(|err: crate::domain::AuditValidationError| err.to_string())?,
        created_at: row.created_at,
    })
}

pub(crate) fn parcel_from_row(row: ParcelRow) -> Result<Parcel, String> {
    let tag_error = |err: crate::domain::ParcelValidationError| err.to_string();
    Ok(Parcel {
        id: ParcelId::new(row.id).map_err(tag_error)?,
        city: row.city,
        district: row.district,
        neighborhood: row.neighborhood,
        island: row.island,
        parsel: row.parsel,
        area: row.area,
        latitude: row.latitude,
        longitude: row.longitude,
        status: row.status.parse().map_err(tag_error)?,
        category: row.category.parse().map_err(tag_error)?,
        crm_stage: row.crm_stage.parse().map_err(tag_error)?,
        tags: row.tags,
        owner_id: optional_user_id(row.owner_id)?,
        assigned_to: optional_user_id(row.assigned_to)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn customer_from_row(row: CustomerRow, parcel_ids: &[i32]) -> Result<Customer, String> {
    let parcel_ids = parcel_ids
        .iter()
        .map(|raw| ParcelId::new(*raw).map_err(|err| err.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Customer {
        id: CustomerId::new(row.id).map_err(|err| err.to_string())?,
        name: row.name,
        role: row.role.parse().map_err(|err: crate::domain::CustomerValidationError| err.to_string())?,
        phone: row.phone,
        email: row.email,
        notes: row.notes,
        owner_id: user_id(row.owner_id)?,
        parcel_ids,
        created_at: row.created_at,
    })
}
