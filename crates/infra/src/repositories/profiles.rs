use std::sync::Mutex;

use chrono::{DateTime, Utc};

use invoiceai_core::{DomainError, DomainResult, OwnerId, ProfileId};
use invoiceai_invoicing::{AssetKind, BusinessProfile, ProfileInput};

use crate::store::OwnerStore;

/// At most one business profile per owner.
pub struct ProfileRepository<S> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S> ProfileRepository<S>
where
    S: OwnerStore<ProfileId, BusinessProfile>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn for_owner(&self, owner: &OwnerId) -> Option<BusinessProfile> {
        self.store.list(owner).into_iter().next()
    }

    pub fn get(&self, owner: &OwnerId, id: &ProfileId) -> DomainResult<BusinessProfile> {
        self.store.get(owner, id).ok_or(DomainError::NotFound)
    }

    pub fn create(
        &self,
        owner: &OwnerId,
        input: ProfileInput,
        now: DateTime<Utc>,
    ) -> DomainResult<BusinessProfile> {
        let profile = BusinessProfile::create(owner.clone(), input, now)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.for_owner(owner).is_some() {
            return Err(DomainError::conflict("business profile already exists"));
        }
        self.store.upsert(owner, profile.id, profile.clone());

        tracing::info!(owner = %owner, profile_id = %profile.id, "business profile created");
        Ok(profile)
    }

    pub fn update(
        &self,
        owner: &OwnerId,
        id: &ProfileId,
        input: ProfileInput,
        now: DateTime<Utc>,
    ) -> DomainResult<BusinessProfile> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut profile = self.store.get(owner, id).ok_or(DomainError::NotFound)?;
        profile.apply(input, now)?;
        self.store.upsert(owner, profile.id, profile.clone());
        Ok(profile)
    }

    /// Attach an uploaded asset. Returns the updated profile and the URL the
    /// asset replaced, so the caller can discard the old file.
    pub fn set_asset(
        &self,
        owner: &OwnerId,
        id: &ProfileId,
        kind: AssetKind,
        url: String,
        now: DateTime<Utc>,
    ) -> DomainResult<(BusinessProfile, Option<String>)> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut profile = self.store.get(owner, id).ok_or(DomainError::NotFound)?;
        let previous = profile.set_asset(kind, url, now);
        self.store.upsert(owner, profile.id, profile.clone());
        Ok((profile, previous))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::InMemoryOwnerStore;

    fn repo() -> ProfileRepository<Arc<InMemoryOwnerStore<ProfileId, BusinessProfile>>> {
        ProfileRepository::new(Arc::new(InMemoryOwnerStore::new()))
    }

    fn input(name: &str) -> ProfileInput {
        ProfileInput {
            business_name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn one_profile_per_owner() {
        let repo = repo();
        let owner = OwnerId::new("user_a").unwrap();

        repo.create(&owner, input("Acme"), Utc::now()).unwrap();
        assert!(matches!(
            repo.create(&owner, input("Acme 2"), Utc::now()),
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(repo.for_owner(&owner).unwrap().business_name, "Acme");
    }

    #[test]
    fn update_is_owner_checked() {
        let repo = repo();
        let a = OwnerId::new("user_a").unwrap();
        let b = OwnerId::new("user_b").unwrap();
        let profile = repo.create(&a, input("Acme"), Utc::now()).unwrap();

        assert_eq!(
            repo.update(&b, &profile.id, input("Hijack"), Utc::now()),
            Err(DomainError::NotFound)
        );
        let updated = repo.update(&a, &profile.id, input("Acme Ltd"), Utc::now()).unwrap();
        assert_eq!(updated.business_name, "Acme Ltd");
    }

    #[test]
    fn set_asset_reports_replaced_url() {
        let repo = repo();
        let a = OwnerId::new("user_a").unwrap();
        let profile = repo.create(&a, input("Acme"), Utc::now()).unwrap();

        let (_, prev) = repo
            .set_asset(&a, &profile.id, AssetKind::Logo, "/uploads/1.png".into(), Utc::now())
            .unwrap();
        assert_eq!(prev, None);

        let (updated, prev) = repo
            .set_asset(&a, &profile.id, AssetKind::Logo, "/uploads/2.png".into(), Utc::now())
            .unwrap();
        assert_eq!(prev.as_deref(), Some("/uploads/1.png"));
        assert_eq!(updated.logo_url.as_deref(), Some("/uploads/2.png"));
    }
}
