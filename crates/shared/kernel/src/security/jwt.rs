use super::{Principal, SecurityError, SecurityErrorExt};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, get_current_timestamp};
use sc_domain::config::JwtConfig;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Registered and role claims read from (or written to) a bearer token.
///
/// Roles may arrive under `role` or `roles`, either as a single string or an array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub role: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "one_or_many")]
    pub aud: Vec<String>,
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub.filter(|s| !s.is_empty()),
            name: claims.name,
            email: claims.email,
            roles: claims.role.into_iter().chain(claims.roles).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}

fn signing_key(config: &JwtConfig) -> Result<&[u8], SecurityError> {
    if config.signing_key.trim().is_empty() {
        return Err(SecurityError::Configuration {
            message: "security.jwt.signing_key is not configured".into(),
            context: None,
        });
    }
    Ok(config.signing_key.as_bytes())
}

/// Validates HS256 bearer tokens against the configured key, issuer and audiences.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("issuer", &self.validation.iss)
            .field("audiences", &self.validation.aud)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier {
    /// # Errors
    /// Fails when no signing key is configured.
    pub fn new(config: &JwtConfig) -> Result<Self, SecurityError> {
        let key = DecodingKey::from_secret(signing_key(config)?);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.clock_skew_seconds;
        validation.set_required_spec_claims(&["exp"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if config.audiences.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(config.audiences.as_slice());
        }

        Ok(Self { key, validation })
    }

    /// # Errors
    /// Returns [`SecurityError::Token`] for a bad signature, an expired token or a
    /// mismatched issuer/audience.
    pub fn verify(&self, token: &str) -> Result<Principal, SecurityError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).context("Verifying bearer token")?;
        Ok(data.claims.into())
    }
}

/// Mints tokens the verifier accepts. Used by the `issue-token` command and by tests.
#[derive(Clone)]
pub struct JwtIssuer {
    key: EncodingKey,
    issuer: Option<String>,
    audiences: Vec<String>,
    ttl_seconds: u64,
}

impl fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("issuer", &self.issuer)
            .field("audiences", &self.audiences)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl JwtIssuer {
    /// # Errors
    /// Fails when no signing key is configured.
    pub fn new(config: &JwtConfig) -> Result<Self, SecurityError> {
        Ok(Self {
            key: EncodingKey::from_secret(signing_key(config)?),
            issuer: config.issuer.clone(),
            audiences: config.audiences.clone(),
            ttl_seconds: config.ttl_seconds,
        })
    }

    /// Claims for `principal`, valid from now for the configured lifetime.
    pub fn claims_for(&self, principal: &Principal) -> Claims {
        let now = get_current_timestamp();
        let mut roles: Vec<String> = principal.roles.iter().cloned().collect();
        roles.sort();

        Claims {
            sub: principal.subject.clone(),
            name: principal.name.clone(),
            email: principal.email.clone(),
            role: Vec::new(),
            roles,
            iss: self.issuer.clone(),
            aud: self.audiences.clone(),
            exp: now + self.ttl_seconds,
            iat: now,
        }
    }

    /// # Errors
    /// Returns [`SecurityError::Token`] if the claims cannot be encoded.
    pub fn sign(&self, claims: &Claims) -> Result<String, SecurityError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key).context("Signing token")
    }

    /// # Errors
    /// Returns [`SecurityError::Token`] if the claims cannot be encoded.
    pub fn issue(&self, principal: &Principal) -> Result<String, SecurityError> {
        self.sign(&self.claims_for(principal))
    }
}
