use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sc_vendors::{LookupTechs, TechApiHttp, VendorsError};
use serde_json::{Value, json};
use url::Url;

async fn tech(Path(subject): Path<String>) -> Result<Json<Value>, StatusCode> {
    match subject.as_str() {
        "tech-1" => Ok(Json(json!({
            "subject": "tech-1",
            "name": "Tina Tech",
            "email": "tina@example.com",
        }))),
        "broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn tech_api() -> TechApiHttp {
    let app = Router::new().route("/api/techs/{subject}", get(tech));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock tech api");
    let address = listener.local_addr().expect("local address");
    tokio::spawn(async move { axum::serve(listener, app).await });

    let base = Url::parse(&format!("http://{address}/api/")).expect("valid base url");
    TechApiHttp::new(base).expect("http client")
}

#[tokio::test]
async fn known_tech_is_returned() {
    let techs = tech_api().await;

    let found = techs.find_tech("tech-1").await.expect("lookup succeeds").expect("tech exists");
    assert_eq!(found.name, "Tina Tech");
    assert_eq!(found.email.as_deref(), Some("tina@example.com"));
    assert_eq!(found.phone, None);
}

#[tokio::test]
async fn unknown_tech_is_none() {
    let techs = tech_api().await;

    assert!(techs.find_tech("nobody").await.expect("lookup succeeds").is_none());
}

#[tokio::test]
async fn server_errors_are_tech_api_errors() {
    let techs = tech_api().await;

    let err = techs.find_tech("broken").await.expect_err("lookup fails");
    assert!(matches!(err, VendorsError::TechApi { .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local address");
    drop(listener);

    let techs = TechApiHttp::new(Url::parse(&format!("http://{address}/")).expect("url")).expect("client");
    let err = techs.find_tech("tech-1").await.expect_err("nothing listens");
    assert!(matches!(err, VendorsError::Http { .. }), "unexpected error: {err}");
}
