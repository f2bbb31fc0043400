use super::{Decision, Principal};
use crate::server::{ApiState, ProblemDetails};
use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

/// What the authentication step learned about the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// No bearer token was presented.
    Anonymous,
    Authenticated(Principal),
    /// A bearer token was presented but did not verify.
    Failed(String),
}

impl Authentication {
    pub const fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }
}

/// Resolves the caller from the `Authorization: Bearer` header.
///
/// Never rejects: it stores an [`Authentication`] (and the [`Principal`], when there is
/// one) in the request extensions and leaves the decision to [`authorize`].
pub async fn authenticate(State(state): State<ApiState>, mut req: Request, next: Next) -> Response {
    let authentication = match bearer_token(req.headers()) {
        None => Authentication::Anonymous,
        Some(token) => match state.verifier.verify(token) {
            Ok(principal) => {
                debug!(subject = ?principal.subject, roles = principal.roles.len(), "Bearer token accepted");
                Authentication::Authenticated(principal)
            },
            Err(err) => {
                warn!(error = %err, path = %req.uri().path(), "Bearer token rejected");
                Authentication::Failed(err.to_string())
            },
        },
    };

    if let Some(principal) = authentication.principal() {
        req.extensions_mut().insert(principal.clone());
    }
    req.extensions_mut().insert(authentication);

    next.run(req).await
}

/// Applies the policy bound to the matched endpoint. Layer it with `route_layer` so
/// that it only runs for routes that exist.
pub async fn authorize(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    let Some(template) = req.extensions().get::<MatchedPath>().map(|p| p.as_str().to_owned()) else {
        warn!(path = %req.uri().path(), "No matched route; denying request");
        return ProblemDetails::forbidden().into_response();
    };

    let Some(policy) = state.policy_for(req.method(), &template) else {
        warn!(route = %template, "No authorization policy resolved; denying request");
        return ProblemDetails::forbidden().into_response();
    };

    match policy.evaluate(req.extensions().get::<Principal>()) {
        Decision::Allow => next.run(req).await,
        Decision::Challenge => {
            let failed = matches!(req.extensions().get::<Authentication>(), Some(Authentication::Failed(_)));
            debug!(route = %template, policy = policy.name(), token_failed = failed, "Challenging caller");

            let mut problem = ProblemDetails::unauthorized().with_instance(req.uri().path());
            if failed {
                problem = problem.with_challenge(r#"Bearer error="invalid_token""#);
            }
            problem.into_response()
        },
        Decision::Forbid { requirement } => {
            warn!(route = %template, policy = policy.name(), ?requirement, "Caller forbidden");
            ProblemDetails::forbidden().with_instance(req.uri().path()).into_response()
        },
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
