use crate::handlers;
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use sc_kernel::domain::constants::POLICY_SOFTWARE_CENTER_MANAGER;
use sc_kernel::security::{EndpointPolicy, authorize};
use sc_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Policies bound to individual vendor endpoints. Unlisted endpoints fall back to the
/// default (authenticated) policy.
pub fn endpoint_policies() -> Vec<EndpointPolicy> {
    vec![EndpointPolicy::new(Method::POST, handlers::COLLECTION_PATH, POLICY_SOFTWARE_CENTER_MANAGER)]
}

/// Vendor controller routes, every one of them behind [`authorize`].
pub fn router(state: ApiState) -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::add_vendor, handlers::list_vendors))
        .routes(routes!(handlers::get_vendor))
        .route_layer(from_fn_with_state(state, authorize))
}
