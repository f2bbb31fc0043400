//! Well-known names used across the service.

/// Connection string holding the document database endpoint.
pub const SOFTWARE: &str = "software";
/// Connection string holding the tech lookup API base address.
pub const TECHS_API: &str = "techs-api";

pub const ROLE_SOFTWARE_CENTER: &str = "SoftwareCenter";
pub const ROLE_MANAGER: &str = "Manager";

/// Requires both [`ROLE_SOFTWARE_CENTER`] and [`ROLE_MANAGER`].
pub const POLICY_SOFTWARE_CENTER_MANAGER: &str = "SoftwareCenterManager";
/// Applied to every route without an explicit binding.
pub const POLICY_AUTHENTICATED: &str = "Authenticated";

pub const DEVELOPMENT: &str = "Development";
pub const PRODUCTION: &str = "Production";

pub const OPENAPI_PATH: &str = "/openapi/v1.json";
pub const SCALAR_PATH: &str = "/scalar";

pub const SYSTEM_TAG: &str = "System";
pub const VENDORS_TAG: &str = "Vendors";

pub const VENDOR: &str = "vendor";
