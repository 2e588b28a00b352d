//! `invoiceai-auth` — session authentication boundary.
//!
//! Identity is delegated to Clerk. This crate verifies the session tokens it
//! issues and turns them into a [`Principal`]. It is decoupled from HTTP and
//! storage.

pub mod claims;
pub mod jwt;
pub mod principal;

pub use claims::{SessionClaims, TokenError, validate_claims};
pub use jwt::{ClerkJwtValidator, Hs256JwtValidator, JwtValidator};
pub use principal::Principal;
