use axum::{extract::Extension, http::StatusCode, response::Response};

use crate::app::errors::json_ok;
use crate::context::PrincipalContext;

pub async fn root() -> &'static str {
    "API WORKING"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> Response {
    json_ok(
        StatusCode::OK,
        serde_json::json!({
            "ownerId": principal.owner_id().as_str(),
            "sessionId": principal.session_id(),
        }),
    )
}
