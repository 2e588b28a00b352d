//! Prompt templates.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Shape the invoice draft must follow, rendered into the prompt.
///
/// Field order here is the order the model sees.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceTemplate<'a> {
    invoice_number: &'a str,
    issue_date: String,
    due_date: &'a str,
    from_business_name: &'a str,
    from_email: &'a str,
    from_address: &'a str,
    from_phone: &'a str,
    client: ClientTemplate<'a>,
    items: [ItemTemplate<'a>; 1],
    tax_percent: u32,
    notes: &'a str,
}

#[derive(Debug, Serialize)]
struct ClientTemplate<'a> {
    name: &'a str,
    email: &'a str,
    address: &'a str,
    phone: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemTemplate<'a> {
    id: &'a str,
    description: &'a str,
    qty: u32,
    unit_price: u32,
}

/// Prompt asking for an invoice JSON object drafted from free text.
pub fn build_invoice_prompt(user_text: &str, today: NaiveDate, invoice_number: &str) -> String {
    let template = InvoiceTemplate {
        invoice_number,
        issue_date: today.format("%Y-%m-%d").to_string(),
        due_date: "",
        from_business_name: "",
        from_email: "",
        from_address: "",
        from_phone: "",
        client: ClientTemplate {
            name: "",
            email: "",
            address: "",
            phone: "",
        },
        items: [ItemTemplate {
            id: "1",
            description: "",
            qty: 1,
            unit_price: 0,
        }],
        tax_percent: 18,
        notes: "",
    };
    let schema = serde_json::to_string_pretty(&template).unwrap_or_default();

    format!(
        r#"
You are an invoice generation assistant.

Task:
  - Analyze the user's input text and produce a valid JSON object only (no explanatory text).
  - The JSON MUST match the schema below (include all fields even if empty).
  - Ensure all dates are ISO 'YYYY-MM-DD' strings and numeric fields are numbers.

Schema:
{schema}

User input:
{user_text}

Output: valid JSON only (no surrounding code fences, no commentary).
"#
    )
}

/// Invoice facts a payment reminder is written from.
///
/// Fields are lenient: strings, numbers and booleans are all accepted, and
/// empty, zero, `false` or `null` values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReminderRequest {
    #[serde(deserialize_with = "lenient_text")]
    pub invoice_id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub client_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub client_email: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub amount: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub due_date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::Null | JsonValue::Bool(false) => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 => None,
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        other => Some(other.to_string()),
    })
}

/// Prompt asking for a `{ "subject", "body" }` reminder email.
pub fn build_reminder_prompt(req: &ReminderRequest) -> String {
    let invoice_id = req.invoice_id.as_deref().unwrap_or_default();
    let client_name = req.client_name.as_deref().unwrap_or("Valued Client");
    let client_email = req.client_email.as_deref().unwrap_or_default();
    let currency = req.currency.as_deref().unwrap_or("INR");
    let amount = req.amount.as_deref().unwrap_or("0");
    let due_date = req.due_date.as_deref().unwrap_or("as soon as possible");
    let status = req.status.as_deref().unwrap_or("Unpaid");
    let notes = req.notes.as_deref().unwrap_or("none");

    format!(
        r#"
You are a professional billing assistant. Write a concise, polite payment reminder email.

Invoice details:
- Invoice Number: {invoice_id}
- Client Name: {client_name}
- Client Email: {client_email}
- Amount Due: {currency} {amount}
- Due Date: {due_date}
- Status: {status}
- Notes: {notes}

Return ONLY a valid JSON object with exactly two string fields:
{{
  "subject": "...",
  "body": "..."
}}

Rules:
- subject: short, professional email subject line
- body: full email body text (plain text, use \n for line breaks)
- Keep it friendly but firm
- Do NOT include code fences or any text outside the JSON
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invoice_prompt_embeds_template_and_input() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let prompt = build_invoice_prompt("Bill Globex 2 hours at 50", today, "INV-4242");

        assert!(prompt.contains("\"invoiceNumber\": \"INV-4242\""));
        assert!(prompt.contains("\"issueDate\": \"2025-06-01\""));
        assert!(prompt.contains("\"taxPercent\": 18"));
        assert!(prompt.contains("\"unitPrice\": 0"));
        assert!(prompt.contains("User input:\nBill Globex 2 hours at 50\n"));

        // The template is emitted in declaration order.
        let number_at = prompt.find("invoiceNumber").unwrap();
        let client_at = prompt.find("\"client\"").unwrap();
        let notes_at = prompt.find("\"notes\"").unwrap();
        assert!(number_at < client_at && client_at < notes_at);
    }

    #[test]
    fn reminder_prompt_applies_defaults() {
        let req = ReminderRequest {
            invoice_id: Some("INV-1001".into()),
            ..Default::default()
        };
        let prompt = build_reminder_prompt(&req);

        assert!(prompt.contains("- Invoice Number: INV-1001"));
        assert!(prompt.contains("- Client Name: Valued Client"));
        assert!(prompt.contains("- Amount Due: INR 0"));
        assert!(prompt.contains("- Due Date: as soon as possible"));
        assert!(prompt.contains("- Status: Unpaid"));
        assert!(prompt.contains("- Notes: none"));
        assert!(prompt.contains("use \\n for line breaks"));
    }

    #[test]
    fn reminder_request_is_lenient() {
        let req: ReminderRequest = serde_json::from_value(json!({
            "invoiceId": 1042,
            "clientName": "",
            "amount": 1500.0,
            "currency": "USD",
            "status": null,
            "notes": false
        }))
        .unwrap();

        assert_eq!(req.invoice_id.as_deref(), Some("1042"));
        assert_eq!(req.client_name, None);
        assert_eq!(req.amount.as_deref(), Some("1500"));
        assert_eq!(req.status, None);
        assert_eq!(req.notes, None);

        let prompt = build_reminder_prompt(&req);
        assert!(prompt.contains("- Amount Due: USD 1500"));
    }

    #[test]
    fn zero_invoice_id_counts_as_missing() {
        let req: ReminderRequest = serde_json::from_value(json!({ "invoiceId": 0 })).unwrap();
        assert_eq!(req.invoice_id, None);

        let req: ReminderRequest = serde_json::from_value(json!({ "amount": "12.50" })).unwrap();
        assert_eq!(req.amount.as_deref(), Some("12.50"));
    }
}
