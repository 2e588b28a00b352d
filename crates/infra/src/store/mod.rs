//! Owner-isolated record storage.

pub mod owner_store;

pub use owner_store::{InMemoryOwnerStore, OwnerStore};
