use crate::security::{AuthorizationPolicy, EndpointPolicy, JwtVerifier, PolicyRegistry};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::Method;
use axum::http::request::Parts;
use fxhash::FxHashMap;
use sc_database::{Database, DocumentSession};
use sc_domain::config::ApiConfig;
use sc_domain::registry::{FeatureSlice, InitializedSlice};
use std::any::TypeId;
use std::borrow::Cow;
use std::convert::Infallible;
use std::ops::Deref;
use std::sync::Arc;

#[sc_derive::sc_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Unknown authorization policy{}: {message}", format_context(.context))]
    UnknownPolicy { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Process-wide services shared by every request.
#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub database: Database,
    pub verifier: JwtVerifier,
    pub policies: PolicyRegistry,
    endpoints: Vec<EndpointPolicy>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner.slices.get(&TypeId::of::<T>()).and_then(InitializedSlice::downcast::<T>)
    }

    /// Returns a reference to the slice if it is registered.
    ///
    /// # Errors
    /// Returns an error if the slice is not registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Names of the registered slices (for diagnostics).
    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> {
        self.inner.slices.values().map(InitializedSlice::name)
    }

    /// The policy guarding `method` on the route template `path`, falling back to the
    /// default policy when the endpoint has no explicit binding.
    pub fn policy_for(&self, method: &Method, path: &str) -> Option<&AuthorizationPolicy> {
        self.inner
            .endpoints
            .iter()
            .find(|binding| binding.matches(method, path))
            .map_or_else(|| self.inner.policies.default_policy(), |binding| self.inner.policies.get(binding.policy))
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for Database {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.database.clone()
    }
}

/// A fresh document session for every request.
impl FromRequestParts<ApiState> for DocumentSession {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        Ok(state.database.lightweight_session())
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    database: Option<Database>,
    verifier: Option<JwtVerifier>,
    policies: PolicyRegistry,
    endpoints: Vec<EndpointPolicy>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    #[must_use]
    pub fn verifier(mut self, verifier: JwtVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    #[must_use]
    pub fn policies(mut self, policies: PolicyRegistry) -> Self {
        self.policies = policies;
        self
    }

    #[must_use]
    pub fn endpoint_policies<I>(mut self, bindings: I) -> Self
    where
        I: IntoIterator<Item = EndpointPolicy>,
    {
        self.endpoints.extend(bindings);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    /// Registers multiple slices at once.
    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        for slice in slices {
            self.slices.insert(slice.id, slice);
        }
        self
    }

    /// # Errors
    /// Fails when the config, database or verifier is missing, or when an endpoint
    /// binding names a policy that is not registered.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let database = self.database.ok_or_else(|| ApiStateError::Validation {
            message: "Database not provided".into(),
            context: None,
        })?;
        let verifier = self.verifier.ok_or_else(|| ApiStateError::Validation {
            message: "JwtVerifier not provided".into(),
            context: None,
        })?;

        if let Some(binding) = self.endpoints.iter().find(|b| !self.policies.contains(b.policy)) {
            return Err(ApiStateError::UnknownPolicy {
                message: format!("{} {} requires '{}'", binding.method, binding.path, binding.policy).into(),
                context: Some("Validating endpoint policies".into()),
            });
        }

        Ok(ApiState {
            inner: Arc::new(ApiStateInner {
                config,
                database,
                verifier,
                policies: self.policies,
                endpoints: self.endpoints,
                slices: self.slices,
            }),
        })
    }
}
