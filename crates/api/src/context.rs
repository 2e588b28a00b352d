use invoiceai_auth::Principal;
use invoiceai_core::OwnerId;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware; every owner-scoped route requires it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.principal.owner_id
    }

    pub fn session_id(&self) -> Option<&str> {
        self.principal.session_id.as_deref()
    }
}
