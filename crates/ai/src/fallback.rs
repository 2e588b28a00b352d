use async_trait::async_trait;

use crate::result::{AiError, Generation};

/// Models tried in order when no override is configured.
pub const DEFAULT_MODEL_CANDIDATES: [&str; 3] = ["gemini-2.5-flash", "gemini-2.0-flash", "gemini-2.0"];

/// Produces text for a prompt with a named model.
///
/// Implementations return the trimmed reply, or an error when the call fails
/// or the reply carries no text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, AiError>;
}

/// Ordered, non-empty list of model names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates(Vec<String>);

impl ModelCandidates {
    pub fn new(models: Vec<String>) -> Result<Self, AiError> {
        let models: Vec<String> = models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if models.is_empty() {
            return Err(AiError::InvalidInput("at least one model candidate is required".into()));
        }
        Ok(Self(models))
    }

    /// Parse a comma-separated list, e.g. `gemini-2.5-flash,gemini-2.0-flash`.
    pub fn parse(csv: &str) -> Result<Self, AiError> {
        Self::new(csv.split(',').map(str::to_string).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ModelCandidates {
    fn default() -> Self {
        Self(DEFAULT_MODEL_CANDIDATES.iter().map(|m| m.to_string()).collect())
    }
}

/// Try each candidate in turn until one yields non-empty text.
///
/// Strictly sequential: a model is only called after the previous one
/// failed. When all fail, the last failure message is kept for the caller.
pub async fn generate_with_fallback(
    generator: &dyn TextGenerator,
    candidates: &ModelCandidates,
    prompt: &str,
) -> Result<Generation, AiError> {
    let mut last_error: Option<String> = None;

    for model in candidates.iter() {
        match generator.generate(model, prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(model, "model produced output");
                return Ok(Generation {
                    text: text.trim().to_string(),
                    model: model.to_string(),
                });
            }
            Ok(_) => {
                tracing::warn!(model, "model returned empty text");
                last_error = Some(AiError::EmptyResponse.to_string());
            }
            Err(e) => {
                tracing::warn!(model, error = %e, "model failed");
                last_error = Some(e.to_string());
            }
        }
    }

    Err(AiError::AllModelsFailed { last_error })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Scripted generator: per-model canned replies, recording call order.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        replies: HashMap<String, Result<String, String>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn reply(mut self, model: &str, text: &str) -> Self {
            self.replies.insert(model.to_string(), Ok(text.to_string()));
            self
        }

        pub fn fail(mut self, model: &str, message: &str) -> Self {
            self.replies.insert(model.to_string(), Err(message.to_string()));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, model: &str, _prompt: &str) -> Result<String, AiError> {
            self.calls.lock().unwrap().push(model.to_string());
            match self.replies.get(model) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(message)) => Err(AiError::Upstream {
                    model: model.to_string(),
                    status: 404,
                    message: message.clone(),
                }),
                None => Err(AiError::EmptyResponse),
            }
        }
    }
}
