//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use crate::fallback::TextGenerator;
use crate::result::AiError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Upstream error bodies are cut to this many characters in error messages.
const MAX_ERROR_BODY: usize = 300;

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AiError::NotConfigured);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, AiError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let res = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let raw = res.text().await?;

        if !status.is_success() {
            return Err(AiError::Upstream {
                model: model.to_string(),
                status: status.as_u16(),
                message: upstream_message(&raw),
            });
        }

        let response = serde_json::from_str::<JsonValue>(&raw).unwrap_or(JsonValue::String(raw));
        text_from_response(&response).ok_or(AiError::EmptyResponse)
    }
}

/// Pull the reply text out of a generation response.
///
/// Besides the Gemini REST shape this accepts the looser shapes other SDK
/// versions and proxies return. Sources, in order:
/// 1. `candidates[0].content.parts[*].text` (thought parts skipped), concatenated
/// 2. top-level `text`
/// 3. `output[0].content[0].text`
/// 4. `outputs[0].text`, then `outputs[0].content`
/// 5. every `outputs` entry, joined by blank lines
/// 6. the whole response re-serialized
///
/// Returns `None` when the result is blank.
pub fn text_from_response(response: &JsonValue) -> Option<String> {
    let text = candidates_text(response)
        .or_else(|| non_empty_str(response.get("text")))
        .or_else(|| non_empty_str(response.pointer("/output/0/content/0/text")))
        .or_else(|| non_empty_str(response.pointer("/outputs/0/text")))
        .or_else(|| non_empty_str(response.pointer("/outputs/0/content")))
        .or_else(|| joined_outputs(response))
        .or_else(|| serialized(response))?;

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn candidates_text(response: &JsonValue) -> Option<String> {
    let parts = response.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter(|p| p.get("thought").and_then(JsonValue::as_bool) != Some(true))
        .filter_map(|p| p.get("text").and_then(JsonValue::as_str))
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

fn joined_outputs(response: &JsonValue) -> Option<String> {
    let outputs = response.get("outputs")?.as_array()?;
    let pieces: Vec<String> = outputs
        .iter()
        .map(|o| match o {
            JsonValue::Null | JsonValue::Bool(false) => String::new(),
            JsonValue::String(s) => s.clone(),
            _ => {
                if let Some(text) = o.get("text").and_then(JsonValue::as_str) {
                    text.to_string()
                } else if let Some(content) = o.get("content").and_then(JsonValue::as_array) {
                    content
                        .iter()
                        .map(|c| c.get("text").and_then(JsonValue::as_str).unwrap_or(""))
                        .collect::<Vec<_>>()
                        .join("\n")
                } else {
                    o.to_string()
                }
            }
        })
        .filter(|s| !s.is_empty())
        .collect();

    if pieces.is_empty() {
        None
    } else {
        Some(pieces.join("\n\n"))
    }
}

fn serialized(response: &JsonValue) -> Option<String> {
    match response {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn non_empty_str(value: Option<&JsonValue>) -> Option<String> {
    value
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn upstream_message(raw: &str) -> String {
    let parsed = serde_json::from_str::<JsonValue>(raw).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/message"))
        .and_then(JsonValue::as_str)
        .unwrap_or(raw);
    message.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn reads_gemini_candidates() {
        let response = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "{\"a\":" },
                        { "text": "1}" }
                    ]
                },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(text_from_response(&response).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn falls_back_through_alternate_shapes() {
        assert_eq!(
            text_from_response(&json!({ "text": " hi " })).as_deref(),
            Some("hi")
        );
        assert_eq!(
            text_from_response(&json!({ "output": [{ "content": [{ "text": "from output" }] }] }))
                .as_deref(),
            Some("from output")
        );
        assert_eq!(
            text_from_response(&json!({ "outputs": [{ "content": "plain content" }] })).as_deref(),
            Some("plain content")
        );
    }

    #[test]
    fn joins_all_outputs_when_first_has_no_text() {
        let response = json!({
            "outputs": [
                null,
                { "content": [{ "text": "a" }, { "text": "b" }] },
                "c",
                { "other": 1 }
            ]
        });
        assert_eq!(
            text_from_response(&response).as_deref(),
            Some("a\nb\n\nc\n\n{\"other\":1}")
        );
    }

    #[test]
    fn last_resort_is_serialized_response() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(
            text_from_response(&response).as_deref(),
            Some(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
        );
        assert_eq!(text_from_response(&JsonValue::Null), None);
        assert_eq!(text_from_response(&json!("   ")), None);
    }

    #[test]
    fn rejects_blank_api_key() {
        assert!(matches!(
            GeminiClient::new(" ", DEFAULT_BASE_URL, None),
            Err(AiError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn posts_prompt_with_api_key_header() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent")
                .header("x-goog-api-key", "test-key")
                .json_body(json!({
                    "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }]
                }));
            then.status(200).json_body(json!({
                "candidates": [{ "content": { "parts": [{ "text": "world" }] } }]
            }));
        });

        let client = GeminiClient::new("test-key", server.base_url(), None).unwrap();
        let text = client.generate("gemini-2.5-flash", "hello").await.unwrap();

        mock.assert();
        assert_eq!(text, "world");
    }

    #[tokio::test]
    async fn surfaces_upstream_error_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1beta/models/gemini-2.0:generateContent");
            then.status(404).json_body(json!({
                "error": { "code": 404, "message": "models/gemini-2.0 is not found", "status": "NOT_FOUND" }
            }));
        });

        let client = GeminiClient::new("k", format!("{}/", server.base_url()), None).unwrap();
        match client.generate("gemini-2.0", "p").await.unwrap_err() {
            AiError::Upstream { status, message, model } => {
                assert_eq!(status, 404);
                assert_eq!(model, "gemini-2.0");
                assert_eq!(message, "models/gemini-2.0 is not found");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
