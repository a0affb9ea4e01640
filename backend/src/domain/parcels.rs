//! Parcel records and their CRM pipeline.
//!
//! A parcel is identified in the land registry by island (ada) and parsel
//! number within a city/district/neighbourhood. Visibility is role scoped:
//! admins see every parcel, other users only those they own or are assigned.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{Identity, Role, UserId};

/// Validation failures for parcel inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParcelValidationError {
    /// Identifiers are positive database keys.
    #[error("parcel id must be positive, got {0}")]
    NonPositiveId(i32),
    /// A text field is outside its length bounds.
    #[error("{field} must be between {min} and {max} characters")]
    Length {
        /// Field name as exposed to clients.
        field: &'static str,
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
    /// Coordinate outside the valid range.
    #[error("{field} is out of range")]
    CoordinateOutOfRange {
        /// `latitude` or `longitude`.
        field: &'static str,
    },
    /// Area must be positive and finite.
    #[error("area must be a positive number")]
    InvalidArea,
    /// Unknown enum tag.
    #[error("unknown {kind} '{value}'")]
    UnknownTag {
        /// Enum being parsed.
        kind: &'static str,
        /// Rejected tag.
        value: String,
    },
}

/// Parcel primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParcelId(i32);

impl ParcelId {
    /// Validate a raw identifier.
    pub fn new(raw: i32) -> Result<Self, ParcelValidationError> {
        if raw <= 0 {
            return Err(ParcelValidationError::NonPositiveId(raw));
        }
        Ok(Self(raw))
    }

    /// Raw database key.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! parcel_tag {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Stored and wire tag.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $tag, )+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParcelValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $tag => Ok(Self::$variant), )+
                    other => Err(ParcelValidationError::UnknownTag {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

parcel_tag! {
    /// Research progress of a parcel.
    ParcelStatus as "parcel status" {
        /// Queued, nothing gathered yet.
        Pending => "PENDING",
        /// Research in progress.
        Researching => "RESEARCHING",
        /// Research finished.
        Completed => "COMPLETED",
    }
}

parcel_tag! {
    /// Zoning / usage category.
    ParcelCategory as "parcel category" {
        /// Housing.
        Residential => "RESIDENTIAL",
        /// Retail and offices.
        Commercial => "COMMERCIAL",
        /// Industrial use.
        Industrial => "INDUSTRIAL",
        /// Farmland.
        Agricultural => "AGRICULTURAL",
        /// Mixed usage.
        MixedUse => "MIXED_USE",
        /// Tourism.
        Tourism => "TOURISM",
        /// Held for investment.
        Investment => "INVESTMENT",
        /// Development land.
        Development => "DEVELOPMENT",
        /// Not yet categorised.
        Uncategorized => "UNCATEGORIZED",
    }
}

parcel_tag! {
    /// Sales pipeline stage.
    CrmStage as "CRM stage" {
        /// Fresh lead.
        NewLead => "NEW_LEAD",
        /// Owner contacted.
        Contacted => "CONTACTED",
        /// Under analysis.
        Analysis => "ANALYSIS",
        /// Offer sent.
        OfferSent => "OFFER_SENT",
        /// Contract signed.
        Contract => "CONTRACT",
        /// Lead lost.
        Lost => "LOST",
    }
}

/// Stored parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    /// Primary key.
    pub id: ParcelId,
    /// City.
    pub city: String,
    /// District.
    pub district: String,
    /// Neighbourhood.
    pub neighborhood: String,
    /// Island (ada) number.
    pub island: String,
    /// Parsel number.
    pub parsel: String,
    /// Area in square metres.
    pub area: Option<f64>,
    /// WGS84 latitude.
    pub latitude: Option<f64>,
    /// WGS84 longitude.
    pub longitude: Option<f64>,
    /// Research progress.
    pub status: ParcelStatus,
    /// Zoning category.
    pub category: ParcelCategory,
    /// Pipeline stage.
    pub crm_stage: CrmStage,
    /// Free-form tags.
    pub tags: Option<String>,
    /// Creator.
    pub owner_id: Option<UserId>,
    /// Assignee.
    pub assigned_to: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl Parcel {
    /// Whether `identity` may see this parcel.
    #[must_use]
    pub fn is_visible_to(&self, identity: &Identity) -> bool {
        identity.role == Role::Admin
            || self.owner_id == Some(identity.user_id)
            || self.assigned_to == Some(identity.user_id)
    }
}

/// Which parcels a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParcelScope {
    /// Every parcel.
    All,
    /// Parcels owned by or assigned to this user.
    OwnedOrAssigned(UserId),
}

impl ParcelScope {
    /// Scope granted to `identity`.
    #[must_use]
    pub fn for_identity(identity: &Identity) -> Self {
        match identity.role {
            Role::Admin => Self::All,
            Role::User => Self::OwnedOrAssigned(identity.user_id),
        }
    }
}

/// Exact-match listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParcelListFilter {
    /// Island number.
    pub island: Option<String>,
    /// Parsel number.
    pub parsel: Option<String>,
    /// Category.
    pub category: Option<ParcelCategory>,
}

/// Raw creation payload.
#[derive(Debug, Clone, Default)]
pub struct ParcelDraft {
    /// City.
    pub city: String,
    /// District.
    pub district: String,
    /// Neighbourhood.
    pub neighborhood: String,
    /// Island number.
    pub island: String,
    /// Parsel number.
    pub parsel: String,
    /// Area in square metres.
    pub area: Option<f64>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Category; defaults to uncategorised.
    pub category: Option<ParcelCategory>,
    /// Free-form tags.
    pub tags: Option<String>,
}

/// Validated parcel ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewParcel {
    /// City.
    pub city: String,
    /// District.
    pub district: String,
    /// Neighbourhood.
    pub neighborhood: String,
    /// Island number.
    pub island: String,
    /// Parsel number.
    pub parsel: String,
    /// Area.
    pub area: Option<f64>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Initial status.
    pub status: ParcelStatus,
    /// Category.
    pub category: ParcelCategory,
    /// Initial stage.
    pub crm_stage: CrmStage,
    /// Tags.
    pub tags: Option<String>,
    /// Creator.
    pub owner_id: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

fn bounded(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<String, ParcelValidationError> {
    let trimmed = value.trim();
    let length = trimmed.chars().count();
    if length < min || length > max {
        return Err(ParcelValidationError::Length { field, min, max });
    }
    Ok(trimmed.to_owned())
}

fn coordinate(
    field: &'static str,
    value: Option<f64>,
    limit: f64,
) -> Result<Option<f64>, ParcelValidationError> {
    match value {
        Some(v) if !v.is_finite() || v.abs() > limit => {
            Err(ParcelValidationError::CoordinateOutOfRange { field })
        }
        other => Ok(other),
    }
}

impl NewParcel {
    /// Validate a draft for `owner`, stamping it with `now`.
    pub fn from_draft(
        draft: ParcelDraft,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, ParcelValidationError> {
        let area = match draft.area {
            Some(value) if !value.is_finite() || value <= 0.0 => {
                return Err(ParcelValidationError::InvalidArea);
            }
            other => other,
        };
        let tags = match draft.tags {
            Some(tags) => Some(bounded("tags", &tags, 0, 500)?).filter(|t| !t.is_empty()),
            None => None,
        };
        Ok(Self {
            city: bounded("city", &draft.city, 2, 50)?,
            district: bounded("district", &draft.district, 2, 50)?,
            neighborhood: bounded("neighborhood", &draft.neighborhood, 2, 100)?,
            island: bounded("island", &draft.island, 1, 20)?,
            parsel: bounded("parsel", &draft.parsel, 1, 20)?,
            area,
            latitude: coordinate("latitude", draft.latitude, 90.0)?,
            longitude: coordinate("longitude", draft.longitude, 180.0)?,
            status: ParcelStatus::Researching,
            category: draft.category.unwrap_or(ParcelCategory::Uncategorized),
            crm_stage: CrmStage::NewLead,
            tags,
            owner_id: owner,
            created_at: now,
        })
    }
}
