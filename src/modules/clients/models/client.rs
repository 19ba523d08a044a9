use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A billable customer. Quotes and invoices must reference one; the
/// renderer uses it for the client block. PEC and SDI are carried as opaque
/// Italian e-invoicing recipient fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub business_name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub vat_number: Option<String>,
    pub tax_code: Option<String>,
    pub pec: Option<String>,
    pub sdi_code: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Display name: business name when present, personal name otherwise
    pub fn display_name(&self) -> &str {
        self.business_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// Incoming client fields
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub business_name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub vat_number: Option<String>,
    pub tax_code: Option<String>,
    pub pec: Option<String>,
    pub sdi_code: Option<String>,
}
