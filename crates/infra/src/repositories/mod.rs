//! Owner-scoped repositories for invoices and business profiles.

pub mod invoices;
pub mod profiles;

pub use invoices::{InvoiceFilter, InvoiceRepository};
pub use profiles::ProfileRepository;
