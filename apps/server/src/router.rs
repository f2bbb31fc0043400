use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use softwarecenter::domain::constants::{OPENAPI_PATH, SCALAR_PATH};
use softwarecenter::kernel::security::authenticate;
use softwarecenter::kernel::server::ApiState;
use softwarecenter::server::router::system_router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::openapi::Components;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "Software Center API"), modifiers(&BearerSecurity))]
struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.components.get_or_insert_with(Components::new).add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

/// Assembles the application. Requests pass the trace layer, then authentication, then
/// the matched route, whose own layer applies authorization before the handler.
pub(crate) fn init(state: ApiState) -> Router {
    let (mut routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(system_router())
        .merge(softwarecenter::controllers(&state))
        .split_for_parts();

    if state.config.environment.is_development() {
        info!(openapi = OPENAPI_PATH, ui = SCALAR_PATH, "Serving API documentation");
        let document = Arc::new(api_doc.clone());
        routes = routes
            .route(
                OPENAPI_PATH,
                get(move || {
                    let document = Arc::clone(&document);
                    async move { Json(document) }
                }),
            )
            .merge(Scalar::with_url(SCALAR_PATH, api_doc));
    }

    routes
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
