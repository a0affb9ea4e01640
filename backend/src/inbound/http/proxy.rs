//! Authenticated pass-through to the internal analysis service.
//!
//! ```text
//! POST /api/v1/proxy/analyze/parcel {"island":"101","parsel":"5"}
//! ```
//!
//! The body is forwarded verbatim and the upstream JSON returned as-is. A
//! non-2xx upstream answer keeps its status with
//! `{"error":"Backend failed: <reason>"}`; an unreachable upstream is 503.

use actix_web::{post, web};
use serde_json::Value;

use crate::domain::AnalysisPath;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error};

/// Forward a JSON request to the analysis service.
#[utoipa::path(
    post,
    path = "/api/v1/proxy/{path}",
    params(("path" = String, Path, description = "Upstream path, may contain slashes")),
    responses(
        (status = 200, description = "Upstream response body"),
        (status = 400, description = "Invalid path or body", body = ErrorSchema),
        (status = 401, description = "No session", body = ErrorSchema),
        (status = 503, description = "Analysis service unreachable", body = ErrorSchema)
    ),
    tags = ["proxy"],
    operation_id = "proxyAnalysis"
)]
#[post("/proxy/{path:.*}")]
pub async fn forward(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<Value>> {
    let target =
        AnalysisPath::parse(&path.into_inner()).map_err(|err| field_error(FieldName::new("path"), err))?;
    let response = state.analysis.forward(target, payload.into_inner()).await?;
    Ok(web::Json(response))
}
