//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle through `web::Data` and depend only on
//! driving ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AnalysisProxy, AuditLogQuery, CustomerCommand, CustomerQuery, LoginService,
    NotificationCommand, NotificationQuery, ParcelCommand, ParcelQuery, UserAdministration,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential checks and password changes.
    pub login: Arc<dyn LoginService>,
    /// Administrative account management.
    pub users: Arc<dyn UserAdministration>,
    /// Audit log reads.
    pub audit: Arc<dyn AuditLogQuery>,
    /// Notification writes.
    pub notifications: Arc<dyn NotificationCommand>,
    /// Notification reads.
    pub notifications_query: Arc<dyn NotificationQuery>,
    /// Parcel writes.
    pub parcels: Arc<dyn ParcelCommand>,
    /// Parcel reads.
    pub parcels_query: Arc<dyn ParcelQuery>,
    /// Customer writes.
    pub customers: Arc<dyn CustomerCommand>,
    /// Customer reads.
    pub customers_query: Arc<dyn CustomerQuery>,
    /// Forwarding to the analysis service.
    pub analysis: Arc<dyn AnalysisProxy>,
}
