//! Invoicing domain records.
//!
//! Invoices and the business profile that issues them, with their validation
//! and derived amounts. Deterministic logic only (no IO, no HTTP, no storage).

pub mod business_profile;
pub mod dates;
pub mod invoice;

pub use business_profile::{AssetKind, BusinessProfile, ProfileInput};
pub use invoice::{
    ClientInfo, Invoice, InvoiceInput, InvoiceStatus, InvoiceTotals, LineItem,
    generate_invoice_number, new_invoice_number,
};
