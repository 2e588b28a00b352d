use axum::{Router, routing::get};

pub mod ai;
pub mod business_profile;
pub mod invoices;
pub mod system;

/// Routes open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .nest("/api/ai", ai::router())
}

/// Owner-scoped routes; the caller adds the auth layer.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/whoami", get(system::whoami))
        .nest("/api/invoice", invoices::router())
        .nest("/api/businessProfile", business_profile::router())
}
