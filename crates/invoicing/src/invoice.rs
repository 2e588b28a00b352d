use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use invoiceai_core::{DomainError, DomainResult, InvoiceId, OwnerId};

use crate::dates::deserialize_opt_date;

pub const DEFAULT_CURRENCY: &str = "INR";
pub const DEFAULT_TAX_PERCENT: f64 = 18.0;

/// Invoice payment status.
///
/// Serialized with the capitalized names the front end displays; parsing is
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Unpaid,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Overdue => "Overdue",
        }
    }
}

impl core::str::FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "unpaid" | "pending" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            other => Err(DomainError::validation(format!(
                "status must be one of: Draft, Unpaid, Paid, Overdue (got '{other}')"
            ))),
        }
    }
}

impl TryFrom<String> for InvoiceStatus {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "one")]
    pub qty: f64,
    #[serde(default)]
    pub unit_price: f64,
}

fn one() -> f64 {
    1.0
}

impl LineItem {
    pub fn amount(&self) -> f64 {
        self.qty * self.unit_price
    }
}

/// Client-supplied invoice fields (create and full update).
///
/// Absent fields fall back to defaults on create and are kept on update
/// where that makes sense (number, issue date, status, currency, tax).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoiceInput {
    pub invoice_number: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub issue_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub due_date: Option<NaiveDate>,
    pub from_business_name: String,
    pub from_email: String,
    pub from_address: String,
    pub from_phone: String,
    pub client: ClientInfo,
    pub items: Vec<LineItem>,
    pub tax_percent: Option<f64>,
    pub notes: String,
    pub status: Option<InvoiceStatus>,
    pub currency: Option<String>,
}

/// Derived amounts, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// A stored invoice owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub owner_id: OwnerId,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub from_business_name: String,
    pub from_email: String,
    pub from_address: String,
    pub from_phone: String,
    pub client: ClientInfo,
    pub items: Vec<LineItem>,
    pub tax_percent: f64,
    pub notes: String,
    pub status: InvoiceStatus,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Build and validate a new invoice from client input.
    pub fn create(owner_id: OwnerId, input: InvoiceInput, now: DateTime<Utc>) -> DomainResult<Self> {
        let invoice_number = match input.invoice_number.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => new_invoice_number(),
        };

        let mut invoice = Self {
            id: InvoiceId::new(),
            owner_id,
            invoice_number,
            issue_date: input.issue_date.unwrap_or_else(|| now.date_naive()),
            due_date: input.due_date,
            from_business_name: input.from_business_name,
            from_email: input.from_email,
            from_address: input.from_address,
            from_phone: input.from_phone,
            client: input.client,
            items: input.items,
            tax_percent: input.tax_percent.unwrap_or(DEFAULT_TAX_PERCENT),
            notes: input.notes,
            status: input.status.unwrap_or_default(),
            currency: normalize_currency(input.currency.as_deref())?,
            created_at: now,
            updated_at: now,
        };
        invoice.number_items();
        invoice.validate()?;
        Ok(invoice)
    }

    /// Replace the editable fields with `input`. On error `self` is unchanged.
    pub fn apply(&mut self, input: InvoiceInput, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();

        if let Some(n) = input.invoice_number.as_deref().map(str::trim) {
            if n.is_empty() {
                return Err(DomainError::validation("invoiceNumber must not be empty"));
            }
            next.invoice_number = n.to_string();
        }
        if let Some(d) = input.issue_date {
            next.issue_date = d;
        }
        next.due_date = input.due_date;
        next.from_business_name = input.from_business_name;
        next.from_email = input.from_email;
        next.from_address = input.from_address;
        next.from_phone = input.from_phone;
        next.client = input.client;
        next.items = input.items;
        if let Some(t) = input.tax_percent {
            next.tax_percent = t;
        }
        next.notes = input.notes;
        if let Some(s) = input.status {
            next.status = s;
        }
        if input.currency.is_some() {
            next.currency = normalize_currency(input.currency.as_deref())?;
        }
        next.updated_at = now;

        next.number_items();
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn totals(&self) -> InvoiceTotals {
        let subtotal: f64 = self.items.iter().map(LineItem::amount).sum();
        let tax = subtotal * self.tax_percent / 100.0;
        InvoiceTotals {
            subtotal: round2(subtotal),
            tax: round2(tax),
            total: round2(subtotal + tax),
        }
    }

    /// Status as of `today`: an unpaid invoice past its due date is overdue.
    pub fn effective_status(&self, today: NaiveDate) -> InvoiceStatus {
        match (self.status, self.due_date) {
            (InvoiceStatus::Unpaid, Some(due)) if due < today => InvoiceStatus::Overdue,
            (status, _) => status,
        }
    }

    /// Case-insensitive match over number, client name and client email.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.invoice_number, &self.client.name, &self.client.email]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn number_items(&mut self) {
        for (idx, item) in self.items.iter_mut().enumerate() {
            if item.id.trim().is_empty() {
                item.id = (idx + 1).to_string();
            }
        }
    }

    fn validate(&self) -> DomainResult<()> {
        if self.invoice_number.trim().is_empty() {
            return Err(DomainError::validation("invoiceNumber must not be empty"));
        }
        if !(0.0..=100.0).contains(&self.tax_percent) {
            return Err(DomainError::validation("taxPercent must be between 0 and 100"));
        }
        for item in &self.items {
            if !item.qty.is_finite() || item.qty < 0.0 {
                return Err(DomainError::validation(format!(
                    "item {}: qty must be a non-negative number",
                    item.id
                )));
            }
            if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                return Err(DomainError::validation(format!(
                    "item {}: unitPrice must be a non-negative number",
                    item.id
                )));
            }
        }
        if !self.totals().total.is_finite() {
            return Err(DomainError::validation("invoice total is too large"));
        }
        if let Some(due) = self.due_date {
            if due < self.issue_date {
                return Err(DomainError::validation("dueDate must not be before issueDate"));
            }
        }
        Ok(())
    }
}

/// `INV-nnnn` with a random four-digit suffix.
pub fn generate_invoice_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("INV-{}", rng.gen_range(1000..=9999))
}

/// [`generate_invoice_number`] with the thread-local RNG.
pub fn new_invoice_number() -> String {
    generate_invoice_number(&mut rand::thread_rng())
}

fn normalize_currency(raw: Option<&str>) -> DomainResult<String> {
    let code = match raw.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_CURRENCY.to_string()),
        Some(c) => c.to_ascii_uppercase(),
    };
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(DomainError::validation(format!(
            "currency must be a 3-letter ISO code (got '{code}')"
        )))
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
