use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Company profile printed on rendered documents. One row per account,
/// written with insert-or-update semantics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanySettings {
    pub account_id: Uuid,
    pub company_name: String,
    pub address: Option<String>,
    pub vat_number: Option<String>,
    pub tax_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub pec: Option<String>,
    pub sdi_code: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl CompanySettings {
    /// Placeholder profile for accounts that have not filled in settings
    /// yet; documents still render, just without a letterhead.
    pub fn empty(account_id: Uuid) -> Self {
        Self {
            account_id,
            company_name: String::new(),
            address: None,
            vat_number: None,
            tax_code: None,
            email: None,
            phone: None,
            pec: None,
            sdi_code: None,
            updated_at: Utc::now(),
        }
    }
}

/// Incoming profile fields
#[derive(Debug, Clone, Deserialize)]
pub struct CompanySettingsInput {
    pub company_name: String,
    pub address: Option<String>,
    pub vat_number: Option<String>,
    pub tax_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub pec: Option<String>,
    pub sdi_code: Option<String>,
}
