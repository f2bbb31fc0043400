//! Bearer-token authentication and policy-based authorization.
//!
//! Requests flow through [`middleware::authenticate`] first, which only records who
//! the caller is, and then through [`middleware::authorize`] on controller routes,
//! which applies the policy bound to the matched endpoint.

pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod policy;
pub mod principal;

pub use identity::{JwtIdentity, ProvideIdentity};
pub use jwt::{Claims, JwtIssuer, JwtVerifier};
pub use middleware::{Authentication, authenticate, authorize};
pub use policy::{AuthorizationPolicy, Decision, EndpointPolicy, PolicyRegistry, Requirement};
pub use principal::Principal;

use std::borrow::Cow;

#[sc_derive::sc_error]
pub enum SecurityError {
    #[error("Security configuration error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Token error{}: {source}", format_context(.context))]
    Token { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },
}
