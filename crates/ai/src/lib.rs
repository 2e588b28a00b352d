//! `invoiceai-ai`
//!
//! **Responsibility:** the generative-language boundary.
//!
//! Prompts are built from request data, sent to hosted Gemini models tried in
//! order, and the first JSON object embedded in the reply is parsed and
//! returned untouched. This crate knows nothing about storage or HTTP routing:
//! - It does not depend on the invoicing domain.
//! - It does not validate the model output against any schema.

pub mod extract;
pub mod fallback;
pub mod gemini;
pub mod prompt;
pub mod result;
pub mod runner;
pub mod task;

pub use extract::extract_json_object;
pub use fallback::{DEFAULT_MODEL_CANDIDATES, ModelCandidates, TextGenerator, generate_with_fallback};
pub use gemini::{GeminiClient, text_from_response};
pub use prompt::{ReminderRequest, build_invoice_prompt, build_reminder_prompt};
pub use result::{AiError, Generation, TaskOutcome};
pub use runner::AiRunner;
pub use task::{AiTask, FailureMessages, InvoiceDraft, PaymentReminder};
