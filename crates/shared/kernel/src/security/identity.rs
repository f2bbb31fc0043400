use super::Principal;
use crate::server::ProblemDetails;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

/// Who is making the current request.
pub trait ProvideIdentity {
    fn subject(&self) -> &str;
    fn name(&self) -> Option<&str>;
    fn email(&self) -> Option<&str>;
}

/// Identity read from the verified bearer token, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtIdentity {
    subject: String,
    principal: Principal,
}

impl JwtIdentity {
    /// `None` when the principal carries no subject.
    pub fn from_principal(principal: Principal) -> Option<Self> {
        let subject = principal.subject.clone()?;
        Some(Self { subject, principal })
    }

    pub const fn principal(&self) -> &Principal {
        &self.principal
    }
}

impl ProvideIdentity for JwtIdentity {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn name(&self) -> Option<&str> {
        self.principal.name.as_deref()
    }

    fn email(&self) -> Option<&str> {
        self.principal.email.as_deref()
    }
}

impl<S> FromRequestParts<S> for JwtIdentity
where
    S: Send + Sync,
{
    type Rejection = ProblemDetails;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts.extensions.get::<Principal>().cloned();
        principal.and_then(Self::from_principal).ok_or_else(|| {
            debug!(path = %parts.uri.path(), "No subject available for the caller");
            ProblemDetails::unauthorized().with_detail("The bearer token does not identify a subject.")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_requires_a_subject() {
        assert!(JwtIdentity::from_principal(Principal::default()).is_none());

        let identity = JwtIdentity::from_principal(Principal::new("tech-7").with_email("t7@example.com"))
            .expect("subject present");
        assert_eq!(identity.subject(), "tech-7");
        assert_eq!(identity.email(), Some("t7@example.com"));
        assert_eq!(identity.name(), None);
    }
}
