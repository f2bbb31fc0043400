//! Request-body validation.
//!
//! A [`Validator`] is built fresh for every request (through `Default`) by the
//! [`ValidJson`] extractor, so validators never share state between requests.

use super::problem::ProblemDetails;
use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::debug;

/// Failure messages grouped by camel-cased property path (`pointOfContact.email`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, property: impl Into<String>, message: impl Into<String>) {
        self.0.entry(property.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, property: &str) -> Option<&[String]> {
        self.0.get(property).map(Vec::as_slice)
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    /// Returns `self` when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Checks one input model and collects every failure.
pub trait Validator<T>: Send + Sync {
    /// # Errors
    /// Returns all failures found in `value`.
    fn validate(&self, value: &T) -> Result<(), ValidationErrors>;
}

/// Associates an input model with the validator that checks it.
pub trait Validated: Sized {
    type Validator: Validator<Self> + Default;
}

/// JSON body extractor that rejects malformed or invalid input with a problem document.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validated,
{
    type Rejection = ProblemDetails;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            debug!(status = %rejection.status(), "Rejected request body");
            // Only a missing JSON content type keeps its own status; every other body problem is a 400.
            let status = match rejection.status() {
                StatusCode::UNSUPPORTED_MEDIA_TYPE => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                _ => StatusCode::BAD_REQUEST,
            };
            ProblemDetails::new(status).with_detail(rejection.body_text())
        })?;

        T::Validator::default().validate(&value).map_err(|errors| {
            debug!(properties = errors.len(), "Request body failed validation");
            ProblemDetails::validation(errors)
        })?;

        Ok(Self(value))
    }
}
