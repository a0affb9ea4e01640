//! CRM customer handlers.
//!
//! ```text
//! GET    /api/v1/crm/customers?parcelId=4
//! POST   /api/v1/crm/customers
//! GET    /api/v1/crm/customers/{id}
//! PATCH  /api/v1/crm/customers/{id}
//! DELETE /api/v1/crm/customers/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Customer, CustomerDraft, CustomerId, CustomerPatchDraft, ParcelId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, request_metadata};

const ID_FIELD: FieldName = FieldName::new("id");
const PARCEL_FIELD: FieldName = FieldName::new("parcelId");

/// Listing filter.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerParams {
    /// Only customers linked to this parcel.
    pub parcel_id: Option<i32>,
}

/// Customer as sent to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    /// Customer identifier.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Relationship to the parcels.
    #[schema(example = "Land Owner")]
    pub role: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Account that owns the record.
    pub owner_id: i32,
    /// Linked parcels.
    pub parcel_ids: Vec<i32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.get(),
            name: customer.name,
            role: customer.role.as_str().to_owned(),
            phone: customer.phone,
            email: customer.email,
            notes: customer.notes,
            owner_id: customer.owner_id.get(),
            parcel_ids: customer.parcel_ids.into_iter().map(ParcelId::get).collect(),
            created_at: customer.created_at,
        }
    }
}

/// Body of `POST /crm/customers`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    /// Display name; must not be blank.
    pub name: String,
    /// `Land Owner`, `Investor`, `Agent`, or `Other`.
    pub role: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Parcel to link on creation.
    #[serde(default)]
    pub parcel_id: Option<i32>,
}

/// Body of `PATCH /crm/customers/{id}`; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    /// Replacement display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement role tag.
    #[serde(default)]
    pub role: Option<String>,
    /// Replacement phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Replacement email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Replacement notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Acknowledgement for deletes.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    /// Always `true` on success.
    pub success: bool,
}

/// Customers owned by the caller; administrators see everyone's.
#[utoipa::path(
    get,
    path = "/api/v1/crm/customers",
    params(CustomerParams),
    responses(
        (status = 200, description = "Customers", body = [CustomerResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema)
    ),
    tags = ["crm"],
    operation_id = "listCustomers"
)]
#[get("/crm/customers")]
pub async fn list_customers(
    Authenticated(identity): Authenticated,
    state: web::Data<HttpState>,
    params: web::Query<CustomerParams>,
) -> ApiResult<web::Json<Vec<CustomerResponse>>> {
    let parcel = params
        .parcel_id
        .map(|raw| parse_id(raw, PARCEL_FIELD, ParcelId::new))
        .transpose()?;
    let customers = state.customers_query.list_customers(identity, parcel).await?;
    Ok(web::Json(customers.into_iter().map(Into::into).collect()))
}

/// Create a customer owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/crm/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Created", body = CustomerResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 404, description = "Linked parcel does not exist", body = ErrorSchema)
    ),
    tags = ["crm"],
    operation_id = "createCustomer"
)]
#[post("/crm/customers")]
pub async fn create_customer(
    Authenticated(identity): Authenticated,
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<CreateCustomerRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = CustomerDraft {
        parcel_id: body
            .parcel_id
            .map(|raw| parse_id(raw, PARCEL_FIELD, ParcelId::new))
            .transpose()?,
        name: body.name,
        role: body.role,
        phone: body.phone,
        email: body.email,
        notes: body.notes,
    };
    let created = state
        .customers
        .create_customer(identity, draft, &request_metadata(&req))
        .await?;
    Ok(HttpResponse::Created().json(CustomerResponse::from(created)))
}

/// One customer; someone else's record is forbidden.
#[utoipa::path(
    get,
    path = "/api/v1/crm/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = CustomerResponse),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 403, description = "Owned by another user", body = ErrorSchema),
        (status = 404, description = "Unknown customer", body = ErrorSchema)
    ),
    tags = ["crm"],
    operation_id = "getCustomer"
)]
#[get("/crm/customers/{id}")]
pub async fn get_customer(
    Authenticated(identity): Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<CustomerResponse>> {
    let id = parse_id(path.into_inner(), ID_FIELD, CustomerId::new)?;
    let customer = state.customers_query.get_customer(identity, id).await?;
    Ok(web::Json(customer.into()))
}

/// Partially update a customer.
#[utoipa::path(
    patch,
    path = "/api/v1/crm/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Updated customer", body = CustomerResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 403, description = "Owned by another user", body = ErrorSchema),
        (status = 404, description = "Unknown customer", body = ErrorSchema)
    ),
    tags = ["crm"],
    operation_id = "updateCustomer"
)]
#[patch("/crm/customers/{id}")]
pub async fn update_customer(
    Authenticated(identity): Authenticated,
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateCustomerRequest>,
) -> ApiResult<web::Json<CustomerResponse>> {
    let id = parse_id(path.into_inner(), ID_FIELD, CustomerId::new)?;
    let UpdateCustomerRequest {
        name,
        role,
        phone,
        email,
        notes,
    } = payload.into_inner();
    let patch = CustomerPatchDraft {
        name,
        role,
        phone,
        email,
        notes,
    };
    let updated = state
        .customers
        .update_customer(identity, id, patch, &request_metadata(&req))
        .await?;
    Ok(web::Json(updated.into()))
}

/// Delete a customer and its parcel links.
#[utoipa::path(
    delete,
    path = "/api/v1/crm/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 403, description = "Owned by another user", body = ErrorSchema),
        (status = 404, description = "Unknown customer", body = ErrorSchema)
    ),
    tags = ["crm"],
    operation_id = "deleteCustomer"
)]
#[delete("/crm/customers/{id}")]
pub async fn delete_customer(
    Authenticated(identity): Authenticated,
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<DeleteResponse>> {
    let id = parse_id(path.into_inner(), ID_FIELD, CustomerId::new)?;
    state
        .customers
        .delete_customer(identity, id, &request_metadata(&req))
        .await?;
    Ok(web::Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::TimeZone;
    use mockall::predicate::{always, eq};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::{CustomerRole, Error, FORBIDDEN_MESSAGE, UserId};
    use crate::inbound::http::test_utils::{TestPorts, admin, login_cookie, test_app, user};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/api/v1")
                .service(list_customers)
                .service(create_customer)
                .service(get_customer)
                .service(update_customer)
                .service(delete_customer),
        );
    }

    fn customer(raw_id: i32, owner: i32) -> Customer {
        Customer {
            id: CustomerId::new(raw_id).expect("valid id"),
            name: "Mehmet Yılmaz".into(),
            role: CustomerRole::LandOwner,
            phone: Some("+90 532 000 00 00".into()),
            email: None,
            notes: None,
            owner_id: UserId::new(owner).expect("valid id"),
            parcel_ids: vec![ParcelId::new(4).expect("valid id")],
            created_at: Utc
                .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
                .single()
                .expect("valid time"),
        }
    }

    #[rstest]
    #[case(test::TestRequest::get().uri("/api/v1/crm/customers"))]
    #[case(test::TestRequest::get().uri("/api/v1/crm/customers/1"))]
    #[case(test::TestRequest::post().uri("/api/v1/crm/customers").set_json(json!({"name":"Ali","role":"Other"})))]
    #[case(test::TestRequest::patch().uri("/api/v1/crm/customers/1").set_json(json!({"notes":"x"})))]
    #[case(test::TestRequest::delete().uri("/api/v1/crm/customers/1"))]
    #[case(test::TestRequest::get().uri("/api/v1/crm/customers?parcelId=abc"))]
    #[case(test::TestRequest::post().uri("/api/v1/crm/customers").insert_header(("content-type", "application/json")).set_payload("{not json"))]
    #[case(test::TestRequest::patch().uri("/api/v1/crm/customers/1").insert_header(("content-type", "application/json")).set_payload("{not json"))]
    #[case(test::TestRequest::delete().uri("/api/v1/crm/customers/abc"))]
    #[actix_rt::test]
    async fn anonymous_callers_get_401_without_port_calls(#[case] request: test::TestRequest) {
        let app = test::init_service(test_app(TestPorts::default().into_state()).configure(routes))
            .await;
        let response = test::call_service(&app, request.to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn listing_forwards_the_parcel_filter() {
        let mut ports = TestPorts::default();
        ports
            .customers_query
            .expect_list_customers()
            .with(eq(user()), eq(Some(ParcelId::new(4).expect("valid id"))))
            .times(1)
            .return_once(|_, _| Ok(vec![customer(2, 7)]));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, user()).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/crm/customers?parcelId=4")
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        let first = body.get(0).expect("one customer");
        assert_eq!(first.get("role").and_then(Value::as_str), Some("Land Owner"));
        assert_eq!(first.get("parcelIds"), Some(&json!([4])));
    }

    #[actix_web::test]
    async fn creation_links_the_parcel() {
        let mut ports = TestPorts::default();
        ports
            .customers
            .expect_create_customer()
            .withf(|identity, draft, _| {
                *identity == user()
                    && draft.role == "Land Owner"
                    && draft.parcel_id.map(ParcelId::get) == Some(4)
            })
            .times(1)
            .return_once(|_, _, _| Ok(customer(2, 7)));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, user()).await;

        let request = test::TestRequest::post()
            .uri("/api/v1/crm/customers")
            .cookie(cookie)
            .set_json(json!({
                "name": "Mehmet Yılmaz",
                "role": "Land Owner",
                "phone": "+90 532 000 00 00",
                "parcelId": 4
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[rstest]
    #[case(Err(Error::forbidden(FORBIDDEN_MESSAGE)), StatusCode::FORBIDDEN)]
    #[case(Err(Error::not_found("customer 5 not found")), StatusCode::NOT_FOUND)]
    #[case(Ok(()), StatusCode::OK)]
    #[actix_rt::test]
    async fn single_record_access_maps_ownership_outcomes(
        #[case] outcome: Result<(), Error>,
        #[case] expected: StatusCode,
    ) {
        let mut ports = TestPorts::default();
        ports
            .customers_query
            .expect_get_customer()
            .with(eq(user()), eq(CustomerId::new(5).expect("valid id")))
            .return_once(move |_, _| outcome.map(|()| customer(5, 7)));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, user()).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/crm/customers/5")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), expected);
    }

    #[actix_web::test]
    async fn patches_carry_only_supplied_fields() {
        let mut ports = TestPorts::default();
        ports
            .customers
            .expect_update_customer()
            .withf(|_, id, patch, _| {
                id.get() == 5
                    && patch.notes.as_deref() == Some("called twice")
                    && patch.name.is_none()
                    && patch.role.is_none()
            })
            .times(1)
            .return_once(|_, _, _, _| Ok(customer(5, 7)));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, user()).await;

        let request = test::TestRequest::patch()
            .uri("/api/v1/crm/customers/5")
            .cookie(cookie)
            .set_json(json!({ "notes": "called twice" }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn deletes_acknowledge_success() {
        let mut ports = TestPorts::default();
        ports
            .customers
            .expect_delete_customer()
            .with(eq(admin()), eq(CustomerId::new(5).expect("valid id")), always())
            .times(1)
            .return_once(|_, _, _| Ok(()));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, admin()).await;

        let request = test::TestRequest::delete()
            .uri("/api/v1/crm/customers/5")
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, json!({ "success": true }));
    }

    #[actix_web::test]
    async fn foreign_deletes_are_forbidden() {
        let mut ports = TestPorts::default();
        ports
            .customers
            .expect_delete_customer()
            .return_once(|_, _, _| Err(Error::forbidden(FORBIDDEN_MESSAGE)));
        let app = test::init_service(test_app(ports.into_state()).configure(routes)).await;
        let cookie = login_cookie(&app, user()).await;

        let request = test::TestRequest::delete()
            .uri("/api/v1/crm/customers/5")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn non_positive_parcel_filters_are_400() {
        let app = test::init_service(test_app(TestPorts::default().into_state()).configure(routes))
            .await;
        let cookie = login_cookie(&app, user()).await;
        let request = test::TestRequest::get()
            .uri("/api/v1/crm/customers?parcelId=-1")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            body.pointer("/details/field").and_then(Value::as_str),
            Some("parcelId")
        );
    }
}
