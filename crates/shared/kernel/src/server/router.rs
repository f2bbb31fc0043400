use super::health;
use super::state::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Anonymous system endpoints. Controller routes are mounted by the feature slices.
pub fn system_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(health::health_handler))
}
