use crate::error::VendorsError;
use crate::models::{AddedBy, CommercialVendorCreateModel, CommercialVendorDetailsModel, PointOfContact};
use chrono::{DateTime, SecondsFormat, Utc};
use sc_database::{Document, SurrealValue};
use sc_kernel::domain::constants::VENDOR;

/// A vendor as stored in the `vendor` collection. Kept flat; the API shape is
/// rebuilt by [`VendorDocument::into_details`].
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
pub struct VendorDocument {
    pub vendor_id: String,
    pub name: String,
    pub site: String,
    pub contact_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub added_by_subject: String,
    pub added_by_name: Option<String>,
    pub added_by_email: Option<String>,
    /// RFC 3339 in UTC with fixed precision, so it also sorts as text.
    pub created_at: String,
}

impl Document for VendorDocument {
    const COLLECTION: &'static str = VENDOR;
    const ID_FIELD: &'static str = "vendor_id";
    const ORDER_BY: &'static str = "created_at";
}

impl VendorDocument {
    pub fn new(
        vendor_id: String,
        model: CommercialVendorCreateModel,
        added_by: AddedBy,
        created_at: DateTime<Utc>,
    ) -> Self {
        let CommercialVendorCreateModel { name, site, point_of_contact } = model;
        Self {
            vendor_id,
            name: name.trim().to_owned(),
            site: site.trim().to_owned(),
            contact_name: point_of_contact.name.trim().to_owned(),
            contact_email: trimmed(point_of_contact.email),
            contact_phone: trimmed(point_of_contact.phone),
            added_by_subject: added_by.subject,
            added_by_name: added_by.name,
            added_by_email: added_by.email,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// # Errors
    /// Fails when the stored timestamp is not RFC 3339.
    pub fn into_details(self) -> Result<CommercialVendorDetailsModel, VendorsError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| VendorsError::Internal {
                message: format!("stored timestamp '{}' is invalid: {e}", self.created_at).into(),
                context: Some(format!("Reading vendor '{}'", self.vendor_id).into()),
            })?
            .with_timezone(&Utc);

        Ok(CommercialVendorDetailsModel {
            id: self.vendor_id,
            name: self.name,
            site: self.site,
            point_of_contact: PointOfContact {
                name: self.contact_name,
                email: self.contact_email,
                phone: self.contact_phone,
            },
            added_by: AddedBy {
                subject: self.added_by_subject,
                name: self.added_by_name,
                email: self.added_by_email,
            },
            created_at,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}
