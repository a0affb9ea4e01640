//! Builders wiring Diesel repositories and the analysis adapter into the
//! HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use parcel_backend::domain::ports::AuditRecorder;
use parcel_backend::domain::{
    AnalysisProxyService, AuditService, CustomerService, NotificationService, ParcelService,
    PasswordLoginService, UserAdminService,
};
use parcel_backend::inbound::http::state::HttpState;
use parcel_backend::outbound::analysis::AnalysisHttpBackend;
use parcel_backend::outbound::persistence::{
    DbPool, DieselAuditLogRepository, DieselCustomerRepository, DieselNotificationRepository,
    DieselParcelRepository, DieselUserRepository,
};

/// Build the handler state from a connection pool and the analysis adapter.
///
/// Services implementing both a command and a query port are shared between
/// the two fields so reads see their own writes through one instance.
pub(crate) fn build_http_state(
    pool: &DbPool,
    analysis: AnalysisHttpBackend,
) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let audit = Arc::new(AuditService::new(
        Arc::new(DieselAuditLogRepository::new(pool.clone())),
        Arc::clone(&clock),
    ));
    let recorder: Arc<dyn AuditRecorder> = audit.clone();

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let login = PasswordLoginService::new(
        Arc::clone(&users),
        Arc::clone(&recorder),
        Arc::clone(&clock),
    );
    let admin = UserAdminService::new(users, Arc::clone(&recorder), Arc::clone(&clock));

    let notifications = Arc::new(NotificationService::new(
        Arc::new(DieselNotificationRepository::new(pool.clone())),
        Arc::clone(&clock),
    ));
    let parcels = Arc::new(ParcelService::new(
        Arc::new(DieselParcelRepository::new(pool.clone())),
        Arc::clone(&recorder),
        Arc::clone(&clock),
    ));
    let customers = Arc::new(CustomerService::new(
        Arc::new(DieselCustomerRepository::new(pool.clone())),
        recorder,
        clock,
    ));

    web::Data::new(HttpState {
        login: Arc::new(login),
        users: Arc::new(admin),
        audit,
        notifications: notifications.clone(),
        notifications_query: notifications,
        parcels: parcels.clone(),
        parcels_query: parcels,
        customers: customers.clone(),
        customers_query: customers,
        analysis: Arc::new(AnalysisProxyService::new(Arc::new(analysis))),
    })
}
