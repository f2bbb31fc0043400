//! Rules for [`CommercialVendorCreateModel`].

use crate::models::{CommercialVendorCreateModel, PointOfContact};
use sc_kernel::server::{Validated, ValidationErrors, Validator};
use url::Url;

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;

#[derive(Debug, Default, Clone, Copy)]
pub struct CommercialVendorCreateModelValidator;

impl Validator<CommercialVendorCreateModel> for CommercialVendorCreateModelValidator {
    fn validate(&self, model: &CommercialVendorCreateModel) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = model.name.trim();
        if name.is_empty() {
            errors.add("name", "'Name' must not be empty.");
        } else if !(NAME_MIN..=NAME_MAX).contains(&name.chars().count()) {
            errors.add("name", format!("'Name' must be between {NAME_MIN} and {NAME_MAX} characters."));
        }

        let site = model.site.trim();
        if site.is_empty() {
            errors.add("site", "'Site' must not be empty.");
        } else if !is_web_url(site) {
            errors.add("site", "'Site' must be an absolute http or https URL.");
        }

        validate_contact(&model.point_of_contact, &mut errors);
        errors.into_result()
    }
}

impl Validated for CommercialVendorCreateModel {
    type Validator = CommercialVendorCreateModelValidator;
}

fn validate_contact(contact: &PointOfContact, errors: &mut ValidationErrors) {
    if contact.name.trim().is_empty() {
        errors.add("pointOfContact.name", "'Name' must not be empty.");
    }

    let email = present(contact.email.as_deref());
    let phone = present(contact.phone.as_deref());
    if email.is_none() && phone.is_none() {
        errors.add("pointOfContact", "An email address or a phone number is required.");
    }

    if let Some(email) = email
        && !is_email(email)
    {
        errors.add("pointOfContact.email", "'Email' is not a valid email address.");
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_web_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
}

/// One `@`, with something on both sides.
fn is_email(raw: &str) -> bool {
    raw.split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'))
}
