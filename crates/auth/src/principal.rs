use invoiceai_core::OwnerId;

use crate::{SessionClaims, TokenError};

/// An authenticated caller.
///
/// The owner id scopes every record the caller can see or change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub owner_id: OwnerId,
    pub session_id: Option<String>,
}

impl Principal {
    pub fn from_claims(claims: &SessionClaims) -> Result<Self, TokenError> {
        let owner_id = OwnerId::new(claims.sub.clone()).map_err(|_| TokenError::MissingSubject)?;
        Ok(Self {
            owner_id,
            session_id: claims.sid.clone(),
        })
    }
}
