use std::sync::Arc;

use crate::extract::extract_json_object;
use crate::fallback::{ModelCandidates, TextGenerator, generate_with_fallback};
use crate::result::{AiError, TaskOutcome};
use crate::task::AiTask;

/// Runs tasks against a generator: model fallback, then JSON extraction and
/// parsing of the winning reply.
#[derive(Clone)]
pub struct AiRunner {
    generator: Arc<dyn TextGenerator>,
    candidates: ModelCandidates,
}

impl AiRunner {
    pub fn new(generator: Arc<dyn TextGenerator>, candidates: ModelCandidates) -> Self {
        Self {
            generator,
            candidates,
        }
    }

    pub fn candidates(&self) -> &ModelCandidates {
        &self.candidates
    }

    pub async fn run(&self, task: &dyn AiTask) -> Result<TaskOutcome, AiError> {
        let prompt = task.prompt();
        let generation =
            generate_with_fallback(self.generator.as_ref(), &self.candidates, &prompt).await?;

        let json_text = extract_json_object(&generation.text).ok_or_else(|| AiError::NoJsonFound {
            raw: generation.text.clone(),
            model: generation.model.clone(),
        })?;

        let data = serde_json::from_str(json_text).map_err(|e| AiError::InvalidJson {
            raw: generation.text.clone(),
            model: generation.model.clone(),
            detail: e.to_string(),
        })?;

        tracing::info!(task = task.name(), model = %generation.model, "generation succeeded");
        Ok(TaskOutcome {
            data,
            model: generation.model,
        })
    }
}
