use chrono::NaiveDate;

use crate::prompt::{ReminderRequest, build_invoice_prompt, build_reminder_prompt};

/// One kind of generation request.
///
/// A task knows how to phrase its prompt and how its failures read to the
/// caller; sending it, choosing models and parsing the reply are the
/// runner's job.
pub trait AiTask: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    fn prompt(&self) -> String;

    fn failure_messages(&self) -> &'static FailureMessages;
}

/// Caller-facing wording for each way a task can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureMessages {
    /// No API key configured.
    pub not_configured: &'static str,
    /// Every candidate model failed.
    pub failed: &'static str,
    /// `detail` used when no model reported an error of its own.
    pub all_models_failed: &'static str,
    /// The reply had no `{...}` block.
    pub no_json: &'static str,
    /// The `{...}` block did not parse.
    pub invalid_json: &'static str,
    /// Whether parse failures name the model that answered.
    pub names_model: bool,
    /// Message for any other error, with the error text as `detail`.
    /// `None` puts the error text in the message itself.
    pub unexpected: Option<&'static str>,
}

/// Draft an invoice from a free-text description.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub user_text: String,
    pub today: NaiveDate,
    pub invoice_number: String,
}

impl InvoiceDraft {
    pub const FAILURES: FailureMessages = FailureMessages {
        not_configured: "Server configuration failed: GEMINI_API_KEY not set",
        failed: "AI generation failed",
        all_models_failed: "All candidate models failed. Check API key, network, or model availability.",
        no_json: "AI returned malformed response (no JSON found)",
        invalid_json: "AI returned invalid JSON",
        names_model: true,
        unexpected: Some("AI generation failed"),
    };

    pub fn new(user_text: impl Into<String>, today: NaiveDate, invoice_number: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            today,
            invoice_number: invoice_number.into(),
        }
    }
}

impl AiTask for InvoiceDraft {
    fn name(&self) -> &'static str {
        "ai.invoice_draft"
    }

    fn prompt(&self) -> String {
        build_invoice_prompt(self.user_text.trim(), self.today, &self.invoice_number)
    }

    fn failure_messages(&self) -> &'static FailureMessages {
        &Self::FAILURES
    }
}

/// Write a payment-reminder email for an invoice.
#[derive(Debug, Clone)]
pub struct PaymentReminder {
    pub request: ReminderRequest,
}

impl PaymentReminder {
    pub const FAILURES: FailureMessages = FailureMessages {
        not_configured: "GEMINI_API_KEY not set",
        failed: "AI reminder generation failed",
        all_models_failed: "All models failed",
        no_json: "AI returned malformed response",
        invalid_json: "AI returned invalid JSON",
        names_model: false,
        unexpected: None,
    };
}

impl AiTask for PaymentReminder {
    fn name(&self) -> &'static str {
        "ai.payment_reminder"
    }

    fn prompt(&self) -> String {
        build_reminder_prompt(&self.request)
    }

    fn failure_messages(&self) -> &'static FailureMessages {
        &Self::FAILURES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_task_reports_its_own_failures() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let draft = InvoiceDraft::new("logo design", today, "INV-1234");
        let reminder = PaymentReminder {
            request: ReminderRequest::default(),
        };

        let (d, r) = (draft.failure_messages(), reminder.failure_messages());
        assert_eq!(d.failed, "AI generation failed");
        assert_eq!(r.failed, "AI reminder generation failed");
        assert_ne!(d.no_json, r.no_json);
        assert_eq!(d.invalid_json, r.invalid_json);
        assert!(d.names_model && !r.names_model);
        assert!(d.unexpected.is_some() && r.unexpected.is_none());
    }
}
