//! Generative helpers: invoice drafting and payment-reminder emails.
//!
//! Both routes are public and answer with the `{success, ...}` envelope.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde_json::json;

use invoiceai_ai::{AiError, AiTask, InvoiceDraft, PaymentReminder, ReminderRequest, TaskOutcome};
use invoiceai_invoicing::new_invoice_number;

use crate::app::dto::{self, GenerateRequest};
use crate::app::errors::{json_error, json_error_with};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/generate", post(generate_invoice))
        .route("/reminder", post(generate_reminder))
}

/// `POST /api/ai/generate`: draft an invoice object from free text.
pub async fn generate_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Response {
    let Some(runner) = services.ai.as_ref() else {
        return json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            InvoiceDraft::FAILURES.not_configured,
        );
    };

    let req: GenerateRequest = dto::parse_body_lenient(&body);
    let Some(prompt) = req.prompt_text() else {
        return json_error(StatusCode::BAD_REQUEST, "Prompt text is required");
    };

    let task = InvoiceDraft::new(prompt.trim(), Utc::now().date_naive(), new_invoice_number());
    match runner.run(&task).await {
        Ok(outcome) => success(outcome),
        Err(e) => failure(&task, e),
    }
}

/// `POST /api/ai/reminder`: write a `{subject, body}` reminder email.
pub async fn generate_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Response {
    let Some(runner) = services.ai.as_ref() else {
        return json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            PaymentReminder::FAILURES.not_configured,
        );
    };

    let request: ReminderRequest = dto::parse_body_lenient(&body);
    if request.invoice_id.is_none() {
        return json_error(StatusCode::BAD_REQUEST, "invoiceId is required");
    }

    let task = PaymentReminder { request };
    match runner.run(&task).await {
        Ok(outcome) => success(outcome),
        Err(e) => failure(&task, e),
    }
}

/// Upstream and parse failures are 502; anything else is a 500.
fn failure(task: &dyn AiTask, err: AiError) -> Response {
    let messages = task.failure_messages();
    let model_field = |model: String| {
        if messages.names_model {
            json!({ "model": model })
        } else {
            json!({})
        }
    };

    match err {
        AiError::AllModelsFailed { last_error } => json_error_with(
            StatusCode::BAD_GATEWAY,
            messages.failed,
            json!({ "detail": last_error.unwrap_or_else(|| messages.all_models_failed.to_string()) }),
        ),
        AiError::NoJsonFound { raw, model } => {
            let mut extra = model_field(model);
            extra["raw"] = json!(raw);
            json_error_with(StatusCode::BAD_GATEWAY, messages.no_json, extra)
        }
        AiError::InvalidJson { raw, model, detail } => {
            let mut extra = model_field(model);
            extra["raw"] = json!(raw);
            extra["detail"] = json!(detail);
            json_error_with(StatusCode::BAD_GATEWAY, messages.invalid_json, extra)
        }
        e => {
            tracing::error!(task = task.name(), error = %e, "AI task error");
            match messages.unexpected {
                Some(message) => json_error_with(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    message,
                    json!({ "detail": e.to_string() }),
                ),
                None => json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            }
        }
    }
}

fn success(outcome: TaskOutcome) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": outcome.data,
            "model": outcome.model,
        })),
    )
        .into_response()
}
