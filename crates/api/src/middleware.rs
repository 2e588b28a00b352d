use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use invoiceai_auth::{JwtValidator, Principal};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Cookie Clerk's frontend SDK stores the session token in.
pub const SESSION_COOKIE: &str = "__session";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token(req.headers()).ok_or_else(unauthorized)?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        unauthorized()
    })?;
    let principal = Principal::from_claims(&claims).map_err(|_| unauthorized())?;

    req.extensions_mut().insert(PrincipalContext::new(principal));

    Ok(next.run(req).await)
}

fn unauthorized() -> Response {
    json_error(StatusCode::UNAUTHORIZED, "Unauthorized")
}

/// Bearer header first, then the session cookie.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    extract_bearer(headers).or_else(|| extract_session_cookie(headers))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

fn extract_session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
