//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories, upload storage and the AI runner
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and body parsing helpers
//! - `errors.rs`: the JSON envelope and error mapping

use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::{AppConfig, ConfigError};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Largest accepted request body (JSON or multipart).
pub const BODY_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> Result<Router, ConfigError> {
    let auth_state = middleware::AuthState {
        jwt: config.auth.validator()?,
    };
    let services = Arc::new(services::build_services(config)?);

    // Protected routes: require a verified session.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let cors = CorsLayer::new()
        .allow_origin(cors_origin(&config.cors_origin)?)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Ok(Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .layer(axum::middleware::map_response(errors::envelope_rejections))
        .layer(Extension(services))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors)))
}

fn cors_origin(origin: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
        var: "CORS_ORIGIN",
        reason: e.to_string(),
    })
}
