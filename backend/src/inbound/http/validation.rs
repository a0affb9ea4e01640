//! Shared validation helpers for inbound HTTP adapters.
//!
//! Malformed bodies, query strings, and path segments all surface as
//! `invalid_request` with a `details` object naming the offending field, so
//! clients see one error envelope regardless of where parsing failed.

use actix_web::{HttpRequest, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use crate::domain::{Error, RequestMetadata};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidId,
    InvalidTimestamp,
    InvalidValue,
    MalformedBody,
    MalformedQuery,
    MalformedPath,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidValue => "invalid_value",
            Self::MalformedBody => "malformed_body",
            Self::MalformedQuery => "malformed_query",
            Self::MalformedPath => "malformed_path",
        }
    }
}

/// Newtype wrapper for client-facing field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

/// `invalid_request` naming the field, the rejected value, and a code.
pub(crate) fn invalid_field(
    field: FieldName,
    code: ValidationCode,
    value: impl Into<String>,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

/// Wrap a domain validation failure so the client learns which field broke.
pub(crate) fn field_error(field: FieldName, error: impl std::fmt::Display) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field.as_str(),
        "code": ValidationCode::InvalidValue.as_str(),
    }))
}

/// Validate a numeric identifier through its domain constructor.
pub(crate) fn parse_id<T, E>(
    raw: i32,
    field: FieldName,
    build: impl FnOnce(i32) -> Result<T, E>,
) -> Result<T, Error> {
    build(raw).map_err(|_| {
        invalid_field(
            field,
            ValidationCode::InvalidId,
            raw.to_string(),
            format!("{} must be a positive integer", field.as_str()),
        )
    })
}

/// Parse an enum-like tag through its `FromStr` implementation.
pub(crate) fn parse_tag<T>(raw: &str, field: FieldName) -> Result<T, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| {
        invalid_field(field, ValidationCode::InvalidValue, raw, error.to_string())
    })
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub(crate) fn parse_date_bound(raw: &str, field: FieldName) -> Result<DateTime<Utc>, Error> {
    let trimmed = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            invalid_field(
                field,
                ValidationCode::InvalidTimestamp,
                raw,
                format!("{} must be an RFC 3339 timestamp or YYYY-MM-DD", field.as_str()),
            )
        })
}

/// Optional variant of [`parse_date_bound`].
pub(crate) fn parse_optional_date_bound(
    raw: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date_bound(value, field))
        .transpose()
}

/// Client address and agent for the audit trail.
///
/// The address is the first `X-Forwarded-For` hop, then `X-Real-IP`, then
/// the socket peer.
pub fn request_metadata(req: &HttpRequest) -> RequestMetadata {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    let forwarded = header("x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());
    let ip_address = forwarded
        .or_else(|| header("x-real-ip"))
        .map(str::to_owned)
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()));
    RequestMetadata {
        ip_address,
        user_agent: header("user-agent").map(str::to_owned),
    }
}

/// JSON extractor config rendering failures in the error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "code": ValidationCode::MalformedBody.as_str() }))
            .into()
    })
}

/// Query extractor config rendering failures in the error envelope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "code": ValidationCode::MalformedQuery.as_str() }))
            .into()
    })
}

/// Path extractor config rendering failures in the error envelope.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "code": ValidationCode::MalformedPath.as_str() }))
            .into()
    })
}
