use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// The first non-empty model output and the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub model: String,
}

/// Parsed JSON extracted from a model reply.
///
/// `data` is whatever object the model produced; it is not checked against
/// the schema the prompt asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutcome {
    pub data: JsonValue,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Missing GEMINI_API_KEY")]
    NotConfigured,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model {model} returned HTTP {status}: {message}")]
    Upstream {
        model: String,
        status: u16,
        message: String,
    },

    #[error("Empty text returned from model")]
    EmptyResponse,

    /// Every candidate failed; carries the last failure, if any was recorded.
    #[error("all candidate models failed")]
    AllModelsFailed { last_error: Option<String> },

    #[error("no JSON object found in model output")]
    NoJsonFound { raw: String, model: String },

    #[error("model output is not valid JSON: {detail}")]
    InvalidJson {
        raw: String,
        model: String,
        detail: String,
    },
}
