use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Router, extract::State};
use sc_database::Database;
use sc_domain::config::{ApiConfig, JwtConfig};
use sc_kernel::security::{
    AuthorizationPolicy, EndpointPolicy, JwtIdentity, JwtIssuer, JwtVerifier, PolicyRegistry, Principal,
    ProvideIdentity, authenticate, authorize,
};
use sc_kernel::server::ApiState;
use tower::ServiceExt;

const AUDITORS: &str = "Auditors";

fn jwt() -> JwtConfig {
    JwtConfig { signing_key: "kernel-authorization-test-key-0123456789".to_owned(), ..JwtConfig::default() }
}

async fn whoami(identity: JwtIdentity, State(state): State<ApiState>) -> String {
    format!("{}@{}", identity.subject(), state.database.database())
}

async fn app() -> Router {
    let database = Database::builder().url("mem://").session("kernel", "authorization").init().await.expect("db");
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(database)
        .verifier(JwtVerifier::new(&jwt()).expect("verifier"))
        .policies(PolicyRegistry::new().with_policy(AuthorizationPolicy::new(AUDITORS).require_role("Auditor")))
        .endpoint_policies([EndpointPolicy::new(Method::DELETE, "/records/{id}", AUDITORS)])
        .build()
        .expect("state");

    let guarded = Router::new()
        .route("/records/{id}", get(whoami).delete(whoami))
        .route_layer(from_fn_with_state(state.clone(), authorize));

    Router::new()
        .route("/open", get(|| async { "open" }))
        .merge(guarded)
        .layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

fn request(method: Method, uri: &str, roles: Option<&[&str]>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(roles) = roles {
        let token = JwtIssuer::new(&jwt())
            .expect("issuer")
            .issue(&Principal::new("auditor-1").with_roles(roles.iter().copied()))
            .expect("token");
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

async fn text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8")
}

#[tokio::test]
async fn unguarded_routes_skip_authorization() {
    let response = app().await.oneshot(request(Method::GET, "/open", None)).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn default_policy_challenges_anonymous_callers() {
    let response = app().await.oneshot(request(Method::GET, "/records/1", None)).await.expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    let body = text(response).await;
    assert!(body.contains("\"status\":401"));
    assert!(body.contains("\"instance\":\"/records/1\""));
}

#[tokio::test]
async fn default_policy_admits_any_authenticated_caller() {
    let response = app().await.oneshot(request(Method::GET, "/records/1", Some(&[]))).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "auditor-1@authorization");
}

#[tokio::test]
async fn bound_policy_requires_its_role() {
    let app = app().await;

    let response = app.clone().oneshot(request(Method::DELETE, "/records/1", Some(&["Viewer"]))).await.expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(text(response).await.contains("\"instance\":\"/records/1\""));

    let response = app.oneshot(request(Method::DELETE, "/records/1", Some(&["Auditor"]))).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn state_rejects_bindings_to_unknown_policies() {
    let database = Database::builder().url("mem://").session("kernel", "unknown").init().await.expect("db");
    let result = ApiState::builder()
        .config(ApiConfig::default())
        .db(database)
        .verifier(JwtVerifier::new(&jwt()).expect("verifier"))
        .endpoint_policies([EndpointPolicy::new(Method::POST, "/records", "Missing")])
        .build();

    assert!(result.is_err());
}
