//! JWT token handling

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::auth::models::Identity;
use crate::config::AuthConfig;
use crate::error::{AuthError, Error, Result};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Upper bound on configured token lifetimes (100 years)
const MAX_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Authenticated identity
    pub user: Identity,
    /// Issued at
    pub iat: i64,
    /// Not before
    pub nbf: i64,
    /// Expiration time
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

impl Claims {
    /// Check if the claims are expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Signs identities into bearer tokens
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
    issuer: String,
    audience: String,
}

impl TokenIssuer {
    pub fn new(
        secret: &[u8],
        ttl: Duration,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            ttl,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a token for `identity`, valid from now
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        self.issue_at(identity, Utc::now())
    }

    /// Create a token as if issued at `now`
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String> {
        if identity.id.trim().is_empty() {
            return Err(Error::Token(
                "cannot issue a token without an identity id".to_string(),
            ));
        }

        let iat = now.timestamp();
        let claims = Claims {
            user: identity.clone(),
            iat,
            nbf: iat,
            exp: iat + self.ttl.num_seconds(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.key)
            .map_err(|e| Error::Token(e.to_string()))
    }
}

/// Checks presented tokens and recovers their claims
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
    audience: Option<String>,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        // Only the signature is checked by jsonwebtoken. Time and claim checks
        // run afterwards against a caller-supplied clock.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            issuer: None,
            audience: None,
        }
    }

    /// Require the `iss` claim to match
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Require the `aud` claim to match
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Validate a token against the current time
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Validate a token as of `now`.
    ///
    /// Checks run in order: structure, signature, expiry/activation, claim
    /// shape. The first failure is the one reported.
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Claims, AuthError> {
        let payload = decode::<serde_json::Value>(token, &self.key, &self.validation)
            .map_err(|e| classify(e.kind()))?
            .claims;

        let now = now.timestamp();
        let timestamp = |name: &str| payload.get(name).and_then(serde_json::Value::as_i64);

        let exp = timestamp("exp");
        if exp.is_some_and(|exp| now >= exp) {
            return Err(AuthError::Expired);
        }
        let nbf = timestamp("nbf");
        let iat = timestamp("iat");
        if nbf.is_some_and(|nbf| now < nbf) || iat.is_some_and(|iat| now < iat) {
            return Err(AuthError::NotActive);
        }

        let exp = exp.ok_or(AuthError::InvalidClaim)?;
        let user: Identity = payload
            .get("user")
            .cloned()
            .and_then(|user| serde_json::from_value(user).ok())
            .ok_or(AuthError::InvalidClaim)?;
        if user.id.trim().is_empty() {
            return Err(AuthError::InvalidClaim);
        }

        let text = |name: &str| {
            payload
                .get(name)
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let iss = text("iss");
        let aud = text("aud");
        if self.issuer.as_ref().is_some_and(|expected| *expected != iss)
            || self.audience.as_ref().is_some_and(|expected| *expected != aud)
        {
            return Err(AuthError::InvalidClaim);
        }

        Ok(Claims {
            user,
            iat: iat.unwrap_or(exp),
            nbf: nbf.or(iat).unwrap_or(exp),
            exp,
            iss,
            aud,
        })
    }
}

/// Map a decoding failure onto the structure/signature stages
fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::ImmatureSignature => AuthError::NotActive,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaim,
        _ => AuthError::InvalidStructure,
    }
}

/// Issuer and verifier sharing one secret
pub struct AuthKeys {
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
}

impl AuthKeys {
    pub fn new(secret: &[u8], config: &AuthConfig) -> Self {
        let ttl_secs = i64::try_from(config.token_ttl_secs)
            .unwrap_or(MAX_TTL_SECS)
            .min(MAX_TTL_SECS);
        let ttl = Duration::seconds(ttl_secs);
        Self {
            issuer: TokenIssuer::new(secret, ttl, &config.issuer, &config.audience),
            verifier: TokenVerifier::new(secret)
                .with_issuer(&config.issuer)
                .with_audience(&config.audience),
        }
    }

    /// Build keys from configuration, or `None` when no secret is set
    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        config
            .secret()
            .map(|secret| Self::new(secret.as_bytes(), config))
    }
}
