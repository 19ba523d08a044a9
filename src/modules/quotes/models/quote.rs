// Quote aggregate: the header row plus its owned line items, treated as one
// consistency unit. Stored totals are recomputed and persisted on every
// write so they stay consistent with the item set.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::billing::{LineItem, LineItemInput, Totals};
use crate::modules::render::FontSize;

/// Number prefix for quotes
pub const QUOTE_NUMBER_PREFIX: &str = "PRE";

/// Quote status lifecycle: draft -> sent -> accepted | rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    /// Closed transition table; anything outside it is rejected
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::Draft, QuoteStatus::Sent)
                | (QuoteStatus::Sent, QuoteStatus::Accepted)
                | (QuoteStatus::Sent, QuoteStatus::Rejected)
        )
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteStatus::Draft => write!(f, "draft"),
            QuoteStatus::Sent => write!(f, "sent"),
            QuoteStatus::Accepted => write!(f, "accepted"),
            QuoteStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuoteStatus::Draft),
            "sent" => Ok(QuoteStatus::Sent),
            "accepted" => Ok(QuoteStatus::Accepted),
            "rejected" => Ok(QuoteStatus::Rejected),
            _ => Err(format!("Invalid quote status: {}", s)),
        }
    }
}

/// A persisted quote with its line items
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: QuoteStatus,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub logo_url: Option<String>,
    pub font_size: FontSize,
    pub footer_text: Option<String>,
    pub converted_invoice_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Joined from quote_items; empty in list views
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Quote {
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            total: self.total,
        }
    }

    /// Advance status along the transition table
    pub fn transition_status(&mut self, next: QuoteStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "Invalid quote status transition from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Full quote submission: header fields plus the complete item set.
/// Used for both create and update; updates replace all prior items.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteDraft {
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
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
pub struct SetQuoteStatusRequest {
    pub status: QuoteStatus,
}
