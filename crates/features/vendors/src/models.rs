use chrono::{DateTime, Utc};
use sc_derive::api_model;

/// Body of `POST /commercial-vendors`.
///
/// Missing members deserialize as empty values so the validator can report them
/// together with every other failure.
#[api_model]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CommercialVendorCreateModel {
    #[serde(default)]
    pub name: String,
    /// Absolute `http` or `https` URL of the vendor's site.
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub point_of_contact: PointOfContact,
}

#[api_model]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PointOfContact {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A stored vendor as returned by the API.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct CommercialVendorDetailsModel {
    pub id: String,
    pub name: String,
    pub site: String,
    pub point_of_contact: PointOfContact,
    pub added_by: AddedBy,
    pub created_at: DateTime<Utc>,
}

/// The tech who added the vendor.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct AddedBy {
    pub subject: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A tech record as served by the tech API.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct TechInfo {
    pub subject: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}
