//! Session-token verification.
//!
//! [`ClerkJwtValidator`] verifies RS256 tokens against the instance's PEM
//! public key (Clerk's networkless verification). [`Hs256JwtValidator`] is a
//! shared-secret validator for local development and tests.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};

use crate::claims::{SessionClaims, TokenError, validate_claims};

/// Default allowance for clock skew, in seconds.
pub const DEFAULT_LEEWAY_SECS: i64 = 5;

/// Verifies a raw bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// Shared-secret HS256 validator (development / tests).
pub struct Hs256JwtValidator {
    key: DecodingKey,
    leeway_secs: i64,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let claims = decode_claims(token, &self.key, signature_only(Algorithm::HS256))?;
        validate_claims(&claims, now, self.leeway_secs)?;
        Ok(claims)
    }
}

/// RS256 validator for Clerk session tokens.
pub struct ClerkJwtValidator {
    key: DecodingKey,
    issuer: Option<String>,
    authorized_parties: Vec<String>,
    leeway_secs: i64,
}

impl ClerkJwtValidator {
    /// Build from the instance's PEM-encoded public key.
    pub fn from_pem(pem: &str) -> Result<Self, TokenError> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| TokenError::Malformed(format!("public key: {e}")))?;
        Ok(Self {
            key,
            issuer: None,
            authorized_parties: Vec::new(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
        })
    }

    /// Require `iss` to equal the given frontend API URL.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Restrict `azp` to these origins. Tokens without `azp` are still accepted.
    pub fn with_authorized_parties(mut self, parties: Vec<String>) -> Self {
        self.authorized_parties = parties;
        self
    }

    pub fn with_leeway(mut self, leeway_secs: i64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

impl JwtValidator for ClerkJwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let claims = decode_claims(token, &self.key, signature_only(Algorithm::RS256))?;
        validate_claims(&claims, now, self.leeway_secs)?;

        if let Some(expected) = &self.issuer {
            if claims.iss.as_deref() != Some(expected.as_str()) {
                return Err(TokenError::UnexpectedIssuer);
            }
        }

        if let Some(azp) = &claims.azp {
            if !self.authorized_parties.is_empty() && !self.authorized_parties.contains(azp) {
                return Err(TokenError::UnauthorizedParty(azp.clone()));
            }
        }

        Ok(claims)
    }
}

// Time-based checks run in `validate_claims` against an injected clock, so
// jsonwebtoken only verifies the header and signature here.
fn signature_only(alg: Algorithm) -> Validation {
    let mut validation = Validation::new(alg);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

fn decode_claims(
    token: &str,
    key: &DecodingKey,
    validation: Validation,
) -> Result<SessionClaims, TokenError> {
    decode::<SessionClaims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::Malformed(e.to_string()),
            _ => TokenError::Rejected(e.to_string()),
        })
}
