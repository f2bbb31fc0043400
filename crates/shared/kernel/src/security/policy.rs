use super::Principal;
use axum::http::Method;
use fxhash::FxHashMap;
use sc_domain::constants::POLICY_AUTHENTICATED;
use std::borrow::Cow;

/// A single condition a caller has to satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    AuthenticatedUser,
    Role(Cow<'static, str>),
}

/// Outcome of evaluating a policy for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No authenticated caller; answer with a 401 challenge.
    Challenge,
    /// Authenticated, but `requirement` is unmet; answer with 403.
    Forbid { requirement: Requirement },
}

/// A named set of requirements, all of which must hold.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    name: Cow<'static, str>,
    requirements: Vec<Requirement>,
}

impl AuthorizationPolicy {
    /// A policy that only requires an authenticated caller.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), requirements: vec![Requirement::AuthenticatedUser] }
    }

    #[must_use]
    pub fn require_role(mut self, role: impl Into<Cow<'static, str>>) -> Self {
        self.requirements.push(Requirement::Role(role.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports the first unmet requirement.
    pub fn evaluate(&self, principal: Option<&Principal>) -> Decision {
        let Some(principal) = principal else {
            return Decision::Challenge;
        };

        self.requirements
            .iter()
            .find(|requirement| match requirement {
                Requirement::AuthenticatedUser => false,
                Requirement::Role(role) => !principal.has_role(role),
            })
            .map_or(Decision::Allow, |requirement| Decision::Forbid { requirement: requirement.clone() })
    }
}

/// Named policies plus the fallback applied to routes without a binding.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    policies: FxHashMap<String, AuthorizationPolicy>,
    default_policy: String,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        let fallback = AuthorizationPolicy::new(POLICY_AUTHENTICATED);
        let mut policies = FxHashMap::default();
        policies.insert(fallback.name().to_owned(), fallback);
        Self { policies, default_policy: POLICY_AUTHENTICATED.to_owned() }
    }
}

impl PolicyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a policy under its own name.
    #[must_use]
    pub fn with_policy(mut self, policy: AuthorizationPolicy) -> Self {
        self.policies.insert(policy.name().to_owned(), policy);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AuthorizationPolicy> {
        self.policies.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    pub fn default_policy(&self) -> Option<&AuthorizationPolicy> {
        self.get(&self.default_policy)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }
}

/// Binds one endpoint, by method and route template, to a named policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPolicy {
    pub method: Method,
    pub path: &'static str,
    pub policy: &'static str,
}

impl EndpointPolicy {
    pub const fn new(method: Method, path: &'static str, policy: &'static str) -> Self {
        Self { method, path, policy }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.path == path
    }
}
