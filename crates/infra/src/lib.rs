//! Infrastructure adapters: record storage, repositories and uploads.
//!
//! Domain rules stay in `invoiceai-invoicing`; this crate only persists
//! their results, scoped per owner.

pub mod repositories;
pub mod store;
pub mod uploads;

pub use repositories::{InvoiceFilter, InvoiceRepository, ProfileRepository};
pub use store::{InMemoryOwnerStore, OwnerStore};
pub use uploads::{UploadError, UploadStore};
