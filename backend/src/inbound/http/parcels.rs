//! Parcel handlers.
//!
//! ```text
//! GET   /api/v1/parcels?island=101&category=TOURISM
//! POST  /api/v1/parcels
//! GET   /api/v1/parcels/{id}
//! PATCH /api/v1/parcels/{id} {"crmStage":"CONTACTED"}
//! ```
//!
//! Regular users only ever see parcels they own or are assigned to; anything
//! else reads as not found.

use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CrmStage, Parcel, ParcelCategory, ParcelDraft, ParcelId, ParcelListFilter, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_tag, request_metadata};

const ID_FIELD: FieldName = FieldName::new("id");

/// Listing filters; all optional and exact-match.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParcelParams {
    /// Ada (block) number.
    pub island: Option<String>,
    /// Parsel number within the block.
    pub parsel: Option<String>,
    /// Category tag such as `TOURISM`.
    pub category: Option<String>,
}

/// Parcel as sent to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParcelResponse {
    /// Parcel identifier.
    pub id: i32,
    /// Province name.
    pub city: String,
    /// District name.
    pub district: String,
    /// Neighbourhood or village name.
    pub neighborhood: String,
    /// Cadastral block (ada) number.
    pub island: String,
    /// Cadastral parcel number within the block.
    pub parsel: String,
    /// Surface area in square metres.
    pub area: Option<f64>,
    /// WGS84 latitude of the parcel centroid.
    pub latitude: Option<f64>,
    /// WGS84 longitude of the parcel centroid.
    pub longitude: Option<f64>,
    /// Processing status such as `PENDING` or `COMPLETED`.
    #[schema(example = "PENDING")]
    pub status: String,
    /// Category tag.
    #[schema(example = "UNCATEGORIZED")]
    pub category: String,
    /// Sales pipeline stage.
    #[schema(example = "NEW_LEAD")]
    pub crm_stage: String,
    /// Free-form comma separated labels.
    pub tags: Option<String>,
    /// Account that registered the parcel.
    pub owner_id: Option<i32>,
    /// Account the parcel is assigned to.
    pub assigned_to: Option<i32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<Parcel> for ParcelResponse {
    fn from(parcel: Parcel) -> Self {
        Self {
            id: parcel.id.get(),
            city: parcel.city,
            district: parcel.district,
            neighborhood: parcel.neighborhood,
            island: parcel.island,
            parsel: parcel.parsel,
            area: parcel.area,
            latitude: parcel.latitude,
            longitude: parcel.longitude,
            status: parcel.status.as_str().to_owned(),
            category: parcel.category.as_str().to_owned(),
            crm_stage: parcel.crm_stage.as_str().to_owned(),
            tags: parcel.tags,
            owner_id: parcel.owner_id.map(UserId::get),
            assigned_to: parcel.assigned_to.map(UserId::get),
            created_at: parcel.created_at,
            updated_at: parcel.updated_at,
        }
    }
}

/// Body of `POST /parcels`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateParcelRequest {
    /// Province name.
    pub city: String,
    /// District name.
    pub district: String,
    /// Neighbourhood or village name.
    pub neighborhood: String,
    /// Cadastral block (ada) number.
    pub island: String,
    /// Cadastral parcel number within the block.
    pub parsel: String,
    /// Surface area in square metres.
    #[serde(default)]
    pub area: Option<f64>,
    /// WGS84 latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// WGS84 longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Defaults to `UNCATEGORIZED`.
    #[serde(default)]
    pub category: Option<String>,
    /// Free-form comma separated labels.
    #[serde(default)]
    pub tags: Option<String>,
}

/// Body of `PATCH /parcels/{id}`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParcelRequest {
    /// New pipeline stage.
    #[schema(example = "CONTACTED")]
    pub crm_stage: String,
}

/// Parcels visible to the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/parcels",
    params(ParcelParams),
    responses(
        (status = 200, description = "Parcels", body = [ParcelResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema)
    ),
    tags = ["parcels"],
    operation_id = "listParcels"
)]
#[get("/parcels")]
pub async fn list_parcels(
    Authenticated(identity): Authenticated,
    state: web::Data<HttpState>,
    params: web::Query<ParcelParams>,
) -> ApiResult<web::Json<Vec<ParcelResponse>>> {
    let ParcelParams {
        island,
        parsel,
        category,
    } = params.into_inner();
    let filter = ParcelListFilter {
        island,
        parsel,
        category: category
            .as_deref()
            .map(|raw| parse_tag::<ParcelCategory>(raw, FieldName::new("category")))
            .transpose()?,
    };
    let parcels = state.parcels_query.list_parcels(identity, filter).await?;
    Ok(web::Json(parcels.into_iter().map(Into::into).collect()))
}

/// Register a parcel owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/parcels",
    request_body = CreateParcelRequest,
    responses(
        (status = 201, description = "Created", body = ParcelResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 409, description = "Location already registered", body = ErrorSchema)
    ),
    tags = ["parcels"],
    operation_id = "createParcel"
)]
#[post("/parcels")]
pub async fn create_parcel(
    Authenticated(identity): Authenticated,
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<CreateParcelRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = ParcelDraft {
        category: body
            .category
            .as_deref()
            .map(|raw| parse_tag::<ParcelCategory>(raw, FieldName::new("category")))
            .transpose()?,
        city: body.city,
        district: body.district,
        neighborhood: body.neighborhood,
        island: body.island,
        parsel: body.parsel,
        area: body.area,
        latitude: body.latitude,
        longitude: body.longitude,
        tags: body.tags,
    };
    let created = state
        .parcels
        .create_parcel(identity, draft, &request_metadata(&req))
        .await?;
    Ok(HttpResponse::Created().json(ParcelResponse::from(created)))
}

/// One parcel, if visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/parcels/{id}",
    params(("id" = i32, Path, description = "Parcel id")),
    responses(
        (status = 200, description = "Parcel", body = ParcelResponse),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 404, description = "Unknown or not visible", body = ErrorSchema)
    ),
    tags = ["parcels"],
    operation_id = "getParcel"
)]
#[get("/parcels/{id}")]
pub async fn get_parcel(
    Authenticated(identity): Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ParcelResponse>> {
    let id = parse_id(path.into_inner(), ID_FIELD, ParcelId::new)?;
    let parcel = state.parcels_query.get_parcel(identity, id).await?;
    Ok(web::Json(parcel.into()))
}

/// Move a parcel to another CRM stage.
#[utoipa::path(
    patch,
    path = "/api/v1/parcels/{id}",
    params(("id" = i32, Path, description = "Parcel id")),
    request_body = UpdateParcelRequest,
    responses(
        (status = 200, description = "Updated parcel", body = ParcelResponse),
        (status = 400, description = "Unknown stage", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 404, description = "Unknown or not visible", body = ErrorSchema)
    ),
    tags = ["parcels"],
    operation_id = "updateParcelStage"
)]
#[patch("/parcels/{id}")]
pub async fn update_parcel(
    Authenticated(identity): Authenticated,
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateParcelRequest>,
) -> ApiResult<web::Json<ParcelResponse>> {
    let id = parse_id(path.into_inner(), ID_FIELD, ParcelId::new)?;
    let stage = parse_tag::<CrmStage>(&payload.crm_stage, FieldName::new("crmStage"))?;
    let updated = state
        .parcels
        .update_crm_stage(identity, id, stage, &request_metadata(&req))
        .await?;
    Ok(web::Json(updated.into()))
}
