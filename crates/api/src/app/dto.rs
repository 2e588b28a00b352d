use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use invoiceai_invoicing::{Invoice, InvoiceStatus, InvoiceTotals};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// `GET /api/invoice` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ListInvoicesQuery {
    /// `None` for a missing, blank or `all` status.
    pub fn status(&self) -> Result<Option<InvoiceStatus>, ApiError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
            Some(s) => s
                .parse()
                .map(Some)
                .map_err(|e: invoiceai_core::DomainError| ApiError::bad_request(e.to_string())),
        }
    }

    pub fn search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// `POST /api/ai/generate` body.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: JsonValue,
}

impl GenerateRequest {
    /// The prompt when it is a non-blank string.
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_str().filter(|p| !p.trim().is_empty())
    }
}

/// Parse a strict JSON body; an empty body reads as `{}`.
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
}

/// Parse a body leniently: anything unreadable becomes `T::default()`.
pub fn parse_body_lenient<T: DeserializeOwned + Default>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap_or_default()
}

// -------------------------
// Response DTOs
// -------------------------

/// Invoice as returned to clients: stored fields plus derived amounts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView<'a> {
    #[serde(flatten)]
    pub invoice: &'a Invoice,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
    /// Same as `total`; the list view reads this name.
    pub amount: f64,
    pub effective_status: InvoiceStatus,
}

impl<'a> InvoiceView<'a> {
    pub fn new(invoice: &'a Invoice, today: NaiveDate) -> Self {
        let totals = invoice.totals();
        Self {
            invoice,
            totals,
            amount: totals.total,
            effective_status: invoice.effective_status(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use invoiceai_core::OwnerId;
    use invoiceai_invoicing::InvoiceInput;

    use super::*;

    #[test]
    fn list_query_status_parsing() {
        let q = ListInvoicesQuery {
            status: Some("paid".into()),
            search: Some("  ".into()),
        };
        assert_eq!(q.status().unwrap(), Some(InvoiceStatus::Paid));
        assert_eq!(q.search(), None);

        let q = ListInvoicesQuery {
            status: Some("All".into()),
            search: None,
        };
        assert_eq!(q.status().unwrap(), None);

        let q = ListInvoicesQuery {
            status: Some("archived".into()),
            search: None,
        };
        assert!(q.status().is_err());
    }

    #[test]
    fn generate_prompt_must_be_non_blank_string() {
        let req: GenerateRequest = parse_body_lenient(br#"{"prompt": 42}"#);
        assert_eq!(req.prompt_text(), None);

        let req: GenerateRequest = parse_body_lenient(b"not json");
        assert_eq!(req.prompt_text(), None);

        let req: GenerateRequest = parse_body_lenient(br#"{"prompt": "  "}"#);
        assert_eq!(req.prompt_text(), None);

        let req: GenerateRequest = parse_body_lenient(br#"{"prompt": "bill Acme"}"#);
        assert_eq!(req.prompt_text(), Some("bill Acme"));
    }

    #[test]
    fn strict_body_accepts_empty_and_rejects_garbage() {
        let input: InvoiceInput = parse_body(b"").unwrap();
        assert_eq!(input, InvoiceInput::default());
        assert!(parse_body::<InvoiceInput>(b"{oops").is_err());
    }

    #[test]
    fn invoice_view_flattens_totals() {
        let input: InvoiceInput = serde_json::from_value(json!({
            "invoiceNumber": "INV-1",
            "issueDate": "2025-01-01",
            "dueDate": "2025-01-10",
            "status": "Unpaid",
            "taxPercent": 10,
            "items": [{ "description": "Work", "qty": 2, "unitPrice": 50 }]
        }))
        .unwrap();
        let owner = OwnerId::new("user_1").unwrap();
        let invoice = Invoice::create(owner, input, Utc::now()).unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let v = serde_json::to_value(InvoiceView::new(&invoice, today)).unwrap();
        assert_eq!(v["invoiceNumber"], "INV-1");
        assert_eq!(v["subtotal"], 100.0);
        assert_eq!(v["tax"], 10.0);
        assert_eq!(v["total"], 110.0);
        assert_eq!(v["amount"], 110.0);
        assert_eq!(v["status"], "Unpaid");
        assert_eq!(v["effectiveStatus"], "Overdue");
    }
}
