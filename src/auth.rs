//! Caller authentication for callable endpoints
//!
//! Callers present `Authorization: Bearer <jwt>`. Tokens are HS256-signed with the
//! configured secret; the `sub` claim is the caller's user id.

use crate::config::AuthConfig;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub uid: String,
}

/// Claims read from a caller token
#[derive(Debug, Serialize, Deserialize)]
pub struct CallerClaims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization header is not a bearer token")]
    MalformedHeader,

    #[error("Token has an empty subject")]
    EmptySubject,

    #[error("Token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// True when the token was well-formed but past its `exp`
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::InvalidToken(e) if matches!(e.kind(), ErrorKind::ExpiredSignature))
    }
}

/// Verifies caller tokens against the configured secret
pub struct Authenticator {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .finish()
    }
}

impl Authenticator {
    /// Build from configuration; `None` when no secret is configured
    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        let secret = config.jwt_secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        let mut required = vec!["exp", "sub"];
        match &config.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        validation.set_required_spec_claims(&required);

        Some(Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        })
    }

    /// Verify a raw `Authorization` header value
    pub fn verify_header(&self, header: &str) -> Result<CallerIdentity, AuthError> {
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedHeader)?;
        self.verify(token)
    }

    /// Verify a bare token
    pub fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let data = decode::<CallerClaims>(token, &self.key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(AuthError::EmptySubject);
        }
        Ok(CallerIdentity {
            uid: data.claims.sub,
        })
    }
}
