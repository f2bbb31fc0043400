use axum::response::{IntoResponse, Response};
use sc_database::DatabaseError;
use sc_kernel::server::ProblemDetails;
use std::borrow::Cow;
use tracing::{error, warn};

/// A specialized [`VendorsError`] enum of this crate.
#[sc_derive::sc_error]
pub enum VendorsError {
    #[error("Vendor not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The tech API answered with an unexpected status.
    #[error("Tech API error{}: {message}", format_context(.context))]
    TechApi { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The tech API could not be reached or its body could not be read.
    #[error("Tech API transport error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Vendor storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal vendors error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<&VendorsError> for ProblemDetails {
    fn from(err: &VendorsError) -> Self {
        match err {
            VendorsError::NotFound { message, .. } => Self::not_found().with_detail(message.as_ref()),
            VendorsError::TechApi { .. } | VendorsError::Http { .. } => {
                Self::bad_gateway().with_detail("The tech lookup service is unavailable.")
            },
            VendorsError::Database { .. } | VendorsError::Internal { .. } => Self::internal(),
        }
    }
}

impl IntoResponse for VendorsError {
    fn into_response(self) -> Response {
        let problem = ProblemDetails::from(&self);
        if problem.status >= 500 {
            error!(error = %self, status = problem.status, "Vendor request failed");
        } else {
            warn!(error = %self, status = problem.status, "Vendor request rejected");
        }
        problem.into_response()
    }
}
