//! Facade crate for the Software Center features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Register the authorization policies and endpoint bindings with the API state.
//! - Call [`init`] to build the feature slices and [`schemas`] for their storage.

pub use sc_domain as domain;
pub use sc_kernel as kernel;

use sc_database::Schema;
use sc_domain::constants::{POLICY_SOFTWARE_CENTER_MANAGER, ROLE_MANAGER, ROLE_SOFTWARE_CENTER};
use sc_domain::registry::InitializedSlice;
use sc_kernel::security::{AuthorizationPolicy, EndpointPolicy, PolicyRegistry};
use sc_kernel::server::ApiState;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

pub mod server {
    pub mod router {
        pub use sc_kernel::server::router::system_router;
    }
}

pub mod features {
    pub use sc_vendors as vendors;
}

/// Named policies controllers can require. The registry's default policy only
/// asks for an authenticated caller.
pub fn authorization_policies() -> PolicyRegistry {
    PolicyRegistry::new().with_policy(
        AuthorizationPolicy::new(POLICY_SOFTWARE_CENTER_MANAGER)
            .require_role(ROLE_SOFTWARE_CENTER)
            .require_role(ROLE_MANAGER),
    )
}

/// Every endpoint-to-policy binding contributed by the features.
pub fn endpoint_policies() -> Vec<EndpointPolicy> {
    features::vendors::endpoint_policies()
}

/// Storage definitions applied when the database opens.
pub fn schemas() -> Vec<Schema> {
    vec![features::vendors::SCHEMA]
}

/// Initialize all features.
pub fn init(techs: Arc<dyn features::vendors::LookupTechs>) -> Vec<InitializedSlice> {
    vec![features::vendors::init(techs)]
}

/// Controller routes of every feature, each guarded by its endpoint policies.
pub fn controllers(state: &ApiState) -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().merge(features::vendors::router(state.clone()))
}
