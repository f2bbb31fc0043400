//! Commercial vendors: the `/commercial-vendors` endpoints, the rules a new vendor
//! must satisfy and the tech lookup that records who added it.

mod documents;
mod error;
mod handlers;
mod models;
mod router;
mod techs;
mod validation;

pub use crate::documents::VendorDocument;
pub use crate::error::{VendorsError, VendorsErrorExt};
pub use crate::models::{AddedBy, CommercialVendorCreateModel, CommercialVendorDetailsModel, PointOfContact, TechInfo};
pub use crate::router::{endpoint_policies, router};
pub use crate::techs::{LookupTechs, TechApiHttp};
pub use crate::validation::CommercialVendorCreateModelValidator;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sc_database::Schema;
use sc_kernel::domain::registry::{FeatureSlice, InitializedSlice};
use sc_kernel::server::{ApiState, ProblemDetails};
use std::any::Any;
use std::sync::Arc;
use tracing::{error, info};

pub const SCHEMA: Schema = Schema::new(
    "vendors",
    "DEFINE TABLE IF NOT EXISTS vendor SCHEMALESS;
     DEFINE INDEX IF NOT EXISTS vendor_id_unique ON TABLE vendor COLUMNS vendor_id UNIQUE;
     DEFINE INDEX IF NOT EXISTS vendor_created_at ON TABLE vendor COLUMNS created_at;",
);

#[derive(Debug)]
pub struct VendorsInner {
    techs: Arc<dyn LookupTechs>,
}

/// Vendors feature state.
#[derive(Debug, Clone)]
pub struct Vendors {
    inner: Arc<VendorsInner>,
}

impl Vendors {
    pub fn new(techs: Arc<dyn LookupTechs>) -> Self {
        Self { inner: Arc::new(VendorsInner { techs }) }
    }

    pub fn techs(&self) -> Arc<dyn LookupTechs> {
        Arc::clone(&self.inner.techs)
    }
}

impl FeatureSlice for Vendors {
    fn name(&self) -> &'static str {
        "vendors"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Initialize the vendors feature around a tech lookup.
pub fn init(techs: Arc<dyn LookupTechs>) -> InitializedSlice {
    info!(techs = ?techs, "Vendors slice initialized");
    InitializedSlice::new(Vendors::new(techs))
}

/// The request-scoped tech lookup registered with the vendors slice.
#[derive(Debug, Clone)]
pub struct Techs(pub Arc<dyn LookupTechs>);

impl FromRequestParts<ApiState> for Techs {
    type Rejection = ProblemDetails;

    async fn from_request_parts(_parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        state.try_get_slice::<Vendors>().map(|slice| Self(slice.techs())).map_err(|err| {
            error!(error = %err, "Vendors slice is not registered");
            ProblemDetails::internal()
        })
    }
}
