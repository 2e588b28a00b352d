use axum::body::to_bytes;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value as JsonValue, json};

use invoiceai_core::DomainError;
use invoiceai_infra::UploadError;

/// Failure envelope: `{ "success": false, "message": ... }`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    json_error_with(status, message, JsonValue::Null)
}

/// Failure envelope with extra top-level fields merged in (`detail`, `raw`, ...).
pub fn json_error_with(status: StatusCode, message: impl Into<String>, extra: JsonValue) -> Response {
    let mut body = json!({
        "success": false,
        "message": message.into(),
    });
    if let (Some(body), JsonValue::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    (status, axum::Json(body)).into_response()
}

/// Success envelope: `{ "success": true, "data": ... }`.
pub fn json_ok(status: StatusCode, data: impl serde::Serialize) -> Response {
    (status, axum::Json(json!({ "success": true, "data": data }))).into_response()
}

// Framework rejection bodies are one-line messages.
const REJECTION_BODY_LIMIT: usize = 64 * 1024;

/// Rewrap non-JSON error responses in the failure envelope.
///
/// Covers what the router and extractors produce on their own: body-limit
/// 413s, query-string 400s, 404/405s and the like. The original text (or the
/// status reason when there is none) becomes `message`; other headers, such
/// as `Allow` on a 405, are kept.
pub async fn envelope_rejections(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(response.headers()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let text = match to_bytes(body, REJECTION_BODY_LIMIT).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "unreadable rejection body");
            String::new()
        }
    };
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("Request failed").to_string()
    } else {
        text
    };

    let (envelope, body) = json_error(status, message).into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.extend(envelope.headers);
    Response::from_parts(parts, body)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Errors returned by the owner-scoped CRUD handlers.
#[derive(Debug)]
pub enum ApiError {
    Domain {
        error: DomainError,
        // Resource name used in 404 messages.
        resource: &'static str,
    },
    Upload(UploadError),
    BadRequest(String),
}

impl ApiError {
    pub fn domain(resource: &'static str) -> impl FnOnce(DomainError) -> Self {
        move |error| Self::Domain { error, resource }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        Self::Upload(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain { error, resource } => domain_error_to_response(error, resource),
            ApiError::Upload(UploadError::Io(e)) => {
                tracing::error!(error = %e, "upload write failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store upload")
            }
            ApiError::Upload(e) => json_error(StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::BadRequest(message) => json_error(StatusCode::BAD_REQUEST, message),
        }
    }
}

pub fn domain_error_to_response(err: DomainError, resource: &str) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, format!("{resource} not found")),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn body_json(response: Response) -> JsonValue {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn plain_text_rejection_becomes_envelope() {
        let plain = (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response();

        let response = envelope_rejections(plain).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(is_json(response.headers()));
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "message": "length limit exceeded" })
        );
    }

    #[tokio::test]
    async fn empty_rejection_uses_status_reason_and_keeps_headers() {
        let response = Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header(header::ALLOW, "GET,HEAD")
            .body(Body::empty())
            .unwrap();

        let response = envelope_rejections(response).await;
        assert_eq!(response.headers()[header::ALLOW], "GET,HEAD");
        assert_eq!(body_json(response).await["message"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn json_and_success_responses_pass_through() {
        let already = json_error(StatusCode::NOT_FOUND, "Invoice not found");
        assert_eq!(
            body_json(envelope_rejections(already).await).await,
            json!({ "success": false, "message": "Invoice not found" })
        );

        let ok = (StatusCode::OK, "API WORKING").into_response();
        let response = envelope_rejections(ok).await;
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"API WORKING");
    }
}
