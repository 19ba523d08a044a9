use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::settings::models::{CompanySettings, CompanySettingsInput};

const SELECT_COLUMNS: &str = "account_id, company_name, address, vat_number, tax_code, email, \
     phone, pec, sdi_code, updated_at";

/// Repository for the per-account company profile
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, account_id: Uuid) -> Result<Option<CompanySettings>> {
        let settings = sqlx::query_as::<_, CompanySettings>(&format!(
            "SELECT {} FROM company_settings WHERE account_id = $1",
            SELECT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Insert-or-update by the account natural key
    pub async fn upsert(
        &self,
        account_id: Uuid,
        input: CompanySettingsInput,
    ) -> Result<CompanySettings> {
        if input.company_name.trim().is_empty() {
            return Err(AppError::validation("Company name cannot be empty"));
        }

        let settings = sqlx::query_as::<_, CompanySettings>(&format!(
            "INSERT INTO company_settings ({columns}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (account_id) DO UPDATE SET \
                 company_name = EXCLUDED.company_name, \
                 address = EXCLUDED.address, \
                 vat_number = EXCLUDED.vat_number, \
                 tax_code = EXCLUDED.tax_code, \
                 email = EXCLUDED.email, \
                 phone = EXCLUDED.phone, \
                 pec = EXCLUDED.pec, \
                 sdi_code = EXCLUDED.sdi_code, \
                 updated_at = EXCLUDED.updated_at \
             RETURNING {columns}",
            columns = SELECT_COLUMNS
        ))
        .bind(account_id)
        .bind(&input.company_name)
        .bind(&input.address)
        .bind(&input.vat_number)
        .bind(&input.tax_code)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.pec)
        .bind(&input.sdi_code)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }
}
