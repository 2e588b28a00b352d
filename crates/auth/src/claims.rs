use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by a Clerk session token.
///
/// Timestamps are unix seconds, as in any JWT. Only `sub`, `iat` and `exp`
/// are required; the rest depend on the instance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the Clerk user id.
    pub sub: String,

    /// Session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    /// Issuer: the Clerk frontend API URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Authorized party: the origin that requested the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature or header rejected: {0}")]
    Rejected(String),

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token has no subject")]
    MissingSubject,

    #[error("unexpected issuer")]
    UnexpectedIssuer,

    #[error("authorized party '{0}' is not allowed")]
    UnauthorizedParty(String),
}

/// Deterministically validate the time window and subject of a session token.
///
/// `leeway_secs` absorbs clock skew between Clerk and this server. Signature
/// verification is done by the validators in [`crate::jwt`].
pub fn validate_claims(
    claims: &SessionClaims,
    now: DateTime<Utc>,
    leeway_secs: i64,
) -> Result<(), TokenError> {
    if claims.sub.trim().is_empty() {
        return Err(TokenError::MissingSubject);
    }
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }

    let now = now.timestamp();
    let not_before = claims.nbf.unwrap_or(claims.iat);
    if now + leeway_secs < not_before {
        return Err(TokenError::NotYetValid);
    }
    if now - leeway_secs >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}
