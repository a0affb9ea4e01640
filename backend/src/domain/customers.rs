//! CRM contacts linked to parcels.
//!
//! Customers belong to the user who created them. Only the owner or an admin
//! may read, change, or delete a customer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{ParcelId, UserId};

const PHONE_MIN_LEN: usize = 10;
const PHONE_MAX_LEN: usize = 20;

/// Validation failures for customer inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomerValidationError {
    /// Identifiers are positive database keys.
    #[error("customer id must be positive, got {0}")]
    NonPositiveId(i32),
    /// Name outside 2..=100 characters.
    #[error("name must be between 2 and 100 characters")]
    NameLength,
    /// Phone number malformed.
    #[error("phone must be 10-20 digits, spaces, or dashes with an optional leading +")]
    InvalidPhone,
    /// Email malformed.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Notes longer than 1000 characters.
    #[error("notes must be at most 1000 characters")]
    NotesTooLong,
    /// Role outside the known set.
    #[error("unknown customer role '{0}'")]
    UnknownRole(String),
}

/// Customer primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomerId(i32);

impl CustomerId {
    /// Validate a raw identifier.
    pub fn new(raw: i32) -> Result<Self, CustomerValidationError> {
        if raw <= 0 {
            return Err(CustomerValidationError::NonPositiveId(raw));
        }
        Ok(Self(raw))
    }

    /// Raw database key.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relationship of a contact to a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerRole {
    /// Owns land.
    LandOwner,
    /// Prospective buyer.
    Investor,
    /// Estate agent.
    Agent,
    /// Anything else.
    Other,
}

impl CustomerRole {
    /// Stored and wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LandOwner => "Land Owner",
            Self::Investor => "Investor",
            Self::Agent => "Agent",
            Self::Other => "Other",
        }
    }
}

impl FromStr for CustomerRole {
    type Err = CustomerValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Land Owner" => Ok(Self::LandOwner),
            "Investor" => Ok(Self::Investor),
            "Agent" => Ok(Self::Agent),
            "Other" => Ok(Self::Other),
            other => Err(CustomerValidationError::UnknownRole(other.to_owned())),
        }
    }
}

impl fmt::Display for CustomerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Primary key.
    pub id: CustomerId,
    /// Full name.
    pub name: String,
    /// Relationship.
    pub role: CustomerRole,
    /// Phone.
    pub phone: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Creating user.
    pub owner_id: UserId,
    /// Linked parcels.
    pub parcel_ids: Vec<ParcelId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Which customers a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerScope {
    /// Every customer.
    All,
    /// Customers owned by this user.
    OwnedBy(UserId),
}

fn name(raw: &str) -> Result<String, CustomerValidationError> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if !(2..=100).contains(&length) {
        return Err(CustomerValidationError::NameLength);
    }
    Ok(trimmed.to_owned())
}

fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn phone(raw: Option<String>) -> Result<Option<String>, CustomerValidationError> {
    let Some(value) = optional_text(raw) else {
        return Ok(None);
    };
    let digits_part = value.strip_prefix('+').unwrap_or(&value);
    let length = digits_part.chars().count();
    let well_formed = digits_part
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
    if !well_formed || !(PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&length) {
        return Err(CustomerValidationError::InvalidPhone);
    }
    Ok(Some(value))
}

fn email(raw: Option<String>) -> Result<Option<String>, CustomerValidationError> {
    match optional_text(raw) {
        Some(value) => super::EmailAddress::parse(&value)
            .map(|email| Some(email.as_str().to_owned()))
            .map_err(|_| CustomerValidationError::InvalidEmail),
        None => Ok(None),
    }
}

fn notes(raw: Option<String>) -> Result<Option<String>, CustomerValidationError> {
    let value = optional_text(raw);
    if value.as_ref().is_some_and(|text| text.chars().count() > 1000) {
        return Err(CustomerValidationError::NotesTooLong);
    }
    Ok(value)
}

/// Raw creation payload.
#[derive(Debug, Clone, Default)]
pub struct CustomerDraft {
    /// Full name.
    pub name: String,
    /// Relationship tag.
    pub role: String,
    /// Phone.
    pub phone: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Parcel to link on creation.
    pub parcel_id: Option<ParcelId>,
}

/// Validated customer ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    /// Full name.
    pub name: String,
    /// Relationship.
    pub role: CustomerRole,
    /// Phone.
    pub phone: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Owner.
    pub owner_id: UserId,
    /// Parcel to link.
    pub parcel_id: Option<ParcelId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl NewCustomer {
    /// Validate a draft for `owner`.
    pub fn from_draft(
        draft: CustomerDraft,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, CustomerValidationError> {
        Ok(Self {
            name: name(&draft.name)?,
            role: draft.role.trim().parse()?,
            phone: phone(draft.phone)?,
            email: email(draft.email)?,
            notes: notes(draft.notes)?,
            owner_id: owner,
            parcel_id: draft.parcel_id,
            created_at: now,
        })
    }
}

/// Raw partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct CustomerPatchDraft {
    /// New name.
    pub name: Option<String>,
    /// New role tag.
    pub role: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New notes.
    pub notes: Option<String>,
}

/// Validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    /// New name.
    pub name: Option<String>,
    /// New role.
    pub role: Option<CustomerRole>,
    /// New phone.
    pub phone: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New notes.
    pub notes: Option<String>,
}

impl CustomerPatch {
    /// True when nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl TryFrom<CustomerPatchDraft> for CustomerPatch {
    type Error = CustomerValidationError;

    fn try_from(draft: CustomerPatchDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            name: draft.name.as_deref().map(name).transpose()?,
            role: draft.role.as_deref().map(|r| r.trim().parse()).transpose()?,
            phone: phone(draft.phone)?,
            email: email(draft.email)?,
            notes: notes(draft.notes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn draft() -> CustomerDraft {
        CustomerDraft {
            name: "Ayşe Yılmaz".to_owned(),
            role: "Land Owner".to_owned(),
            ..CustomerDraft::default()
        }
    }

    fn owner() -> UserId {
        UserId::new(3).expect("valid id")
    }

    #[rstest]
    #[case(Some("+90 532 123 45 67"), true)]
    #[case(Some("0532-123-4567"), true)]
    #[case(Some("12345"), false)]
    #[case(Some("call me maybe"), false)]
    #[case(Some("   "), true)]
    #[case(None, true)]
    fn phone_format(#[case] raw: Option<&str>, #[case] ok: bool) {
        let input = CustomerDraft {
            phone: raw.map(str::to_owned),
            ..draft()
        };
        assert_eq!(NewCustomer::from_draft(input, owner(), Utc::now()).is_ok(), ok);
    }

    #[rstest]
    #[case("Land Owner", CustomerRole::LandOwner)]
    #[case("Investor", CustomerRole::Investor)]
    #[case("Agent", CustomerRole::Agent)]
    #[case("Other", CustomerRole::Other)]
    fn roles_parse_from_display_tags(#[case] tag: &str, #[case] expected: CustomerRole) {
        assert_eq!(tag.parse::<CustomerRole>(), Ok(expected));
    }

    #[rstest]
    fn short_name_is_rejected() {
        let input = CustomerDraft {
            name: "A".to_owned(),
            ..draft()
        };
        assert_eq!(
            NewCustomer::from_draft(input, owner(), Utc::now()),
            Err(CustomerValidationError::NameLength)
        );
    }

    #[rstest]
    fn long_notes_are_rejected() {
        let input = CustomerDraft {
            notes: Some("x".repeat(1001)),
            ..draft()
        };
        assert_eq!(
            NewCustomer::from_draft(input, owner(), Utc::now()),
            Err(CustomerValidationError::NotesTooLong)
        );
    }

    #[rstest]
    fn patch_validates_present_fields_only() {
        let patch = CustomerPatch::try_from(CustomerPatchDraft {
            role: Some("Agent".to_owned()),
            ..CustomerPatchDraft::default()
        })
        .expect("valid patch");
        assert_eq!(patch.role, Some(CustomerRole::Agent));
        assert!(patch.name.is_none());
        assert!(!patch.is_empty());
        assert!(CustomerPatch::default().is_empty());
    }
}
