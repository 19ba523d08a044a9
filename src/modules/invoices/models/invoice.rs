// Invoice aggregate. Mirrors the quote shape, with a payment dimension on
// top of the document lifecycle: the two move independently, a sent invoice
// can be partially paid without leaving "sent".

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::billing::{LineItem, LineItemInput, Totals};
use crate::modules::render::FontSize;

/// Number prefix for invoices
pub const INVOICE_NUMBER_PREFIX: &str = "INV";

/// Invoice status lifecycle: draft -> sent -> paid | overdue, and an
/// overdue invoice can still be paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    /// Closed transition table; anything outside it is rejected
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        matches!(
            (self, next),
            (InvoiceStatus::Draft, InvoiceStatus::Sent)
                | (InvoiceStatus::Sent, InvoiceStatus::Paid)
                | (InvoiceStatus::Sent, InvoiceStatus::Overdue)
                | (InvoiceStatus::Overdue, InvoiceStatus::Paid)
        )
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// How much of the invoice has been settled. Free to move in any
/// direction; bookkeeping corrections happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Completed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Partial => write!(f, "partial"),
            PaymentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "partial" => Ok(PaymentStatus::Partial),
            "completed" => Ok(PaymentStatus::Completed),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// A persisted invoice with its line items
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: InvoiceStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub logo_url: Option<String>,
    pub font_size: FontSize,
    pub footer_text: Option<String>,
    /// Set when this invoice came out of a quote conversion
    pub quote_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Joined from invoice_items; empty in list views
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Invoice {
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            total: self.total,
        }
    }

    /// Advance status along the transition table
    pub fn transition_status(&mut self, next: InvoiceStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "Invalid invoice status transition from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Full invoice submission: header fields plus the complete item set.
/// Used for both create and update; updates replace all prior items.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceDraft {
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tax_enabled: bool,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub font_size: FontSize,
    pub footer_text: Option<String>,
    pub items: Vec<LineItemInput>,
}

/// Explicit status change request
#[derive(Debug, Clone, Deserialize)]
pub struct SetInvoiceStatusRequest {
    pub status: InvoiceStatus,
}

/// Payment bookkeeping change request
#[derive(Debug, Clone, Deserialize)]
pub struct SetPaymentStatusRequest {
    pub payment_status: PaymentStatus,
}
