use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

use invoiceai_core::{DomainError, DomainResult, InvoiceId, OwnerId};
use invoiceai_invoicing::{Invoice, InvoiceInput, InvoiceStatus};

use crate::store::OwnerStore;

/// List query: optional status (as of `today`) and free-text search.
#[derive(Debug, Clone)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub search: Option<String>,
    pub today: NaiveDate,
}

impl InvoiceFilter {
    pub fn all(today: NaiveDate) -> Self {
        Self {
            status: None,
            search: None,
            today,
        }
    }

    fn accepts(&self, invoice: &Invoice) -> bool {
        if let Some(status) = self.status {
            if invoice.effective_status(self.today) != status {
                return false;
            }
        }
        match &self.search {
            Some(needle) => invoice.matches(needle),
            None => true,
        }
    }
}

/// Invoices per owner. Invoice numbers are unique within an owner.
pub struct InvoiceRepository<S> {
    store: S,
    // Serializes check-then-write sequences (number uniqueness).
    write_lock: Mutex<()>,
}

impl<S> InvoiceRepository<S>
where
    S: OwnerStore<InvoiceId, Invoice>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn create(&self, owner: &OwnerId, input: InvoiceInput, now: DateTime<Utc>) -> DomainResult<Invoice> {
        let invoice = Invoice::create(owner.clone(), input, now)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.ensure_number_free(owner, &invoice.invoice_number, None)?;
        self.store.upsert(owner, invoice.id, invoice.clone());

        tracing::info!(owner = %owner, invoice_id = %invoice.id, number = %invoice.invoice_number, "invoice created");
        Ok(invoice)
    }

    pub fn get(&self, owner: &OwnerId, id: &InvoiceId) -> DomainResult<Invoice> {
        self.store.get(owner, id).ok_or(DomainError::NotFound)
    }

    /// Matching invoices, newest first.
    pub fn list(&self, owner: &OwnerId, filter: &InvoiceFilter) -> Vec<Invoice> {
        let mut items: Vec<Invoice> = self
            .store
            .list(owner)
            .into_iter()
            .filter(|inv| filter.accepts(inv))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.as_uuid().cmp(a.id.as_uuid())));
        items
    }

    pub fn update(
        &self,
        owner: &OwnerId,
        id: &InvoiceId,
        input: InvoiceInput,
        now: DateTime<Utc>,
    ) -> DomainResult<Invoice> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut invoice = self.get(owner, id)?;
        invoice.apply(input, now)?;
        self.ensure_number_free(owner, &invoice.invoice_number, Some(id))?;
        self.store.upsert(owner, invoice.id, invoice.clone());

        tracing::info!(owner = %owner, invoice_id = %id, "invoice updated");
        Ok(invoice)
    }

    pub fn delete(&self, owner: &OwnerId, id: &InvoiceId) -> DomainResult<Invoice> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let removed = self.store.remove(owner, id).ok_or(DomainError::NotFound)?;
        tracing::info!(owner = %owner, invoice_id = %id, "invoice deleted");
        Ok(removed)
    }

    fn ensure_number_free(&self, owner: &OwnerId, number: &str, except: Option<&InvoiceId>) -> DomainResult<()> {
        let taken = self
            .store
            .list(owner)
            .iter()
            .any(|inv| Some(&inv.id) != except && inv.invoice_number.eq_ignore_ascii_case(number));
        if taken {
            return Err(DomainError::conflict(format!("invoice number '{number}' already exists")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use invoiceai_invoicing::ClientInfo;

    use super::*;
    use crate::store::InMemoryOwnerStore;

    type Repo = InvoiceRepository<Arc<InMemoryOwnerStore<InvoiceId, Invoice>>>;

    fn repo() -> Repo {
        InvoiceRepository::new(Arc::new(InMemoryOwnerStore::new()))
    }

    fn owner(id: &str) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    fn input(number: &str, client: &str) -> InvoiceInput {
        InvoiceInput {
            invoice_number: Some(number.into()),
            client: ClientInfo {
                name: client.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn duplicate_number_conflicts_per_owner_only() {
        let repo = repo();
        let now = Utc::now();
        repo.create(&owner("a"), input("INV-1001", "Globex"), now).unwrap();

        let err = repo.create(&owner("a"), input("inv-1001", "Initech"), now).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        repo.create(&owner("b"), input("INV-1001", "Initech"), now).unwrap();
    }

    #[test]
    fn other_owners_cannot_read_or_delete() {
        let repo = repo();
        let inv = repo.create(&owner("a"), input("INV-1", "Globex"), Utc::now()).unwrap();

        assert_eq!(repo.get(&owner("b"), &inv.id), Err(DomainError::NotFound));
        assert_eq!(repo.delete(&owner("b"), &inv.id), Err(DomainError::NotFound));
        assert_eq!(repo.get(&owner("a"), &inv.id).unwrap().id, inv.id);
    }

    #[test]
    fn list_filters_and_orders_newest_first() {
        let repo = repo();
        let o = owner("a");
        let t0 = Utc::now();

        let mut first = input("INV-1", "Globex");
        first.status = Some(InvoiceStatus::Paid);
        repo.create(&o, first, t0).unwrap();
        repo.create(&o, input("INV-2", "Initech"), t0 + Duration::seconds(1)).unwrap();
        repo.create(&o, input("INV-3", "Globex West"), t0 + Duration::seconds(2)).unwrap();

        let today = t0.date_naive();
        let all = repo.list(&o, &InvoiceFilter::all(today));
        let numbers: Vec<_> = all.iter().map(|i| i.invoice_number.as_str()).collect();
        assert_eq!(numbers, ["INV-3", "INV-2", "INV-1"]);

        let globex = repo.list(
            &o,
            &InvoiceFilter {
                search: Some("globex".into()),
                ..InvoiceFilter::all(today)
            },
        );
        assert_eq!(globex.len(), 2);

        let paid = repo.list(
            &o,
            &InvoiceFilter {
                status: Some(InvoiceStatus::Paid),
                ..InvoiceFilter::all(today)
            },
        );
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].invoice_number, "INV-1");
    }

    #[test]
    fn update_cannot_steal_existing_number() {
        let repo = repo();
        let o = owner("a");
        let now = Utc::now();
        repo.create(&o, input("INV-1", "Globex"), now).unwrap();
        let second = repo.create(&o, input("INV-2", "Initech"), now).unwrap();

        let err = repo.update(&o, &second.id, input("INV-1", "Initech"), now).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Keeping its own number is fine.
        let updated = repo.update(&o, &second.id, input("INV-2", "Initech Ltd"), now).unwrap();
        assert_eq!(updated.client.name, "Initech Ltd");
        assert_eq!(repo.get(&o, &second.id).unwrap().client.name, "Initech Ltd");
    }

    #[test]
    fn delete_returns_removed_invoice() {
        let repo = repo();
        let o = owner("a");
        let inv = repo.create(&o, input("INV-9", "Globex"), Utc::now()).unwrap();

        assert_eq!(repo.delete(&o, &inv.id).unwrap().id, inv.id);
        assert_eq!(repo.get(&o, &inv.id), Err(DomainError::NotFound));
    }
}
