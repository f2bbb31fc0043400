//! RFC 7807 problem documents, the body of every non-success response.

use super::validation::ValidationErrors;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use sc_derive::api_model;
use std::collections::BTreeMap;
use tracing::error;

pub const PROBLEM_JSON: &str = "application/problem+json";

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type.
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: Option<String>,
    pub instance: Option<String>,
    /// Validation failures keyed by camel-cased property path.
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    /// Sent as `WWW-Authenticate` on 401 responses.
    #[serde(skip)]
    pub challenge: Option<&'static str>,
}

impl ProblemDetails {
    pub fn new(status: StatusCode) -> Self {
        Self {
            r#type: type_for(status).to_owned(),
            title: status.canonical_reason().unwrap_or("Error").to_owned(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            errors: None,
            challenge: None,
        }
    }

    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST)
    }

    /// A 401 carrying a bearer challenge.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED).with_challenge("Bearer")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn bad_gateway() -> Self {
        Self::new(StatusCode::BAD_GATEWAY)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        let mut problem = Self::bad_request().with_title("One or more validation errors occurred.");
        problem.errors = Some(errors.into_inner());
        problem
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub const fn with_challenge(mut self, challenge: &'static str) -> Self {
        self.challenge = Some(challenge);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match serde_json::to_vec(&self) {
            Ok(body) => body,
            Err(err) => {
                error!(error = %err, "Failed to serialize problem details");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            },
        };

        let mut response = (status, [(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON))], body)
            .into_response();
        if let Some(challenge) = self.challenge {
            response.headers_mut().insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
        }
        response
    }
}

fn type_for(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "https://tools.ietf.org/html/rfc9110#section-15.5.1",
        401 => "https://tools.ietf.org/html/rfc9110#section-15.5.2",
        403 => "https://tools.ietf.org/html/rfc9110#section-15.5.4",
        404 => "https://tools.ietf.org/html/rfc9110#section-15.5.5",
        409 => "https://tools.ietf.org/html/rfc9110#section-15.5.10",
        415 => "https://tools.ietf.org/html/rfc9110#section-15.5.16",
        422 => "https://tools.ietf.org/html/rfc9110#section-15.5.21",
        502 => "https://tools.ietf.org/html/rfc9110#section-15.6.3",
        503 => "https://tools.ietf.org/html/rfc9110#section-15.6.4",
        _ if status.is_server_error() => "https://tools.ietf.org/html/rfc9110#section-15.6.1",
        _ => "about:blank",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nulls_are_omitted_from_the_wire_format() {
        let value = serde_json::to_value(ProblemDetails::not_found().with_detail("vendor 'x' was not found"))
            .expect("serialize");

        assert_eq!(
            value,
            json!({
                "type": "https://tools.ietf.org/html/rfc9110#section-15.5.5",
                "title": "Not Found",
                "status": 404,
                "detail": "vendor 'x' was not found"
            })
        );
    }

    #[test]
    fn unauthorized_responses_carry_a_bearer_challenge() {
        let response = ProblemDetails::unauthorized().into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(response.headers()[header::CONTENT_TYPE], PROBLEM_JSON);
    }

    #[test]
    fn validation_problems_list_errors_per_property() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "'name' must not be empty.");
        let problem = ProblemDetails::validation(errors);

        assert_eq!(problem.status, 400);
        assert_eq!(problem.title, "One or more validation errors occurred.");
        assert_eq!(problem.errors.as_ref().map(BTreeMap::len), Some(1));
    }
}
