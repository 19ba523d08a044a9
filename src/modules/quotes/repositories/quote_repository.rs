// Postgres persistence for the quote aggregate. Every multi-step write
// (header + items, delete + reinsert, items-then-header delete) runs inside
// one transaction so readers never observe a partially-written aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::money::round2;
use crate::core::{AppError, Result};
use crate::modules::billing::{next_number, LineItem};
use crate::modules::quotes::models::{Quote, QuoteStatus, QUOTE_NUMBER_PREFIX};
use crate::modules::render::FontSize;

const HEADER_COLUMNS: &str = "id, number, client_id, issue_date, expiry_date, notes, status, \
     subtotal, tax_rate, tax_amount, total, logo_url, font_size, footer_text, \
     converted_invoice_id, created_by, created_at, updated_at";

/// Attempts at allocating a unique sequential number before giving up.
/// The unique index on `number` turns a lost race into a retry.
const NUMBER_ALLOC_ATTEMPTS: u32 = 3;

/// Repository for quote database operations
#[derive(Clone)]
pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a quote with its line items in one transaction. The sequential
    /// number is derived from the latest persisted quote inside the same
    /// transaction; a concurrent writer taking the same number trips the
    /// unique index and the allocation is retried. LENGTH sorts before the
    /// lexicographic tiebreak so PRE-1000 beats PRE-999 when timestamps
    /// collide.
    pub async fn create(&self, quote: &Quote) -> Result<Quote> {
        let mut last_error: Option<AppError> = None;

        for _ in 0..NUMBER_ALLOC_ATTEMPTS {
            let mut tx = self.pool.begin().await?;

            let latest: Option<String> = sqlx::query_scalar(
                "SELECT number FROM quotes \
                 ORDER BY created_at DESC, LENGTH(number) DESC, number DESC LIMIT 1",
            )
            .fetch_optional(&mut *tx)
            .await?;

            let mut created = quote.clone();
            created.number = next_number(QUOTE_NUMBER_PREFIX, latest.as_deref())?;

            match insert_header(&mut tx, &created).await {
                Ok(()) => {
                    insert_items(&mut tx, created.id, &created.items).await?;
                    tx.commit().await?;
                    return Ok(created);
                }
                Err(AppError::Database(e)) if is_unique_violation(&e) => {
                    tracing::warn!(
                        number = %created.number,
                        "Quote number already taken, retrying allocation"
                    );
                    last_error = Some(AppError::Database(e));
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::NumberGeneration("Could not allocate a quote number".to_string())
        }))
    }

    /// Find a quote by id, including its line items
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>> {
        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {} FROM quotes WHERE id = $1",
            HEADER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, QuoteItemRow>(
            "SELECT description, quantity, unit_price, vat_rate FROM quote_items \
             WHERE quote_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_quote(
            items.into_iter().map(QuoteItemRow::into_line_item).collect(),
        )?))
    }

    /// List quotes, newest first, without line items
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Quote>> {
        let rows = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {} FROM quotes ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            HEADER_COLUMNS
        ))
        .bind(limit.min(100))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| row.into_quote(vec![])).collect()
    }

    /// Replace the header fields and the full item set in one transaction.
    /// Readers never observe the aggregate between the delete and the
    /// reinsert.
    pub async fn update(&self, quote: &Quote) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE quotes SET client_id = $2, issue_date = $3, expiry_date = $4, notes = $5, \
             subtotal = $6, tax_rate = $7, tax_amount = $8, total = $9, logo_url = $10, \
             font_size = $11, footer_text = $12, updated_at = $13 \
             WHERE id = $1",
        )
        .bind(quote.id)
        .bind(quote.client_id)
        .bind(quote.issue_date)
        .bind(quote.expiry_date)
        .bind(&quote.notes)
        .bind(quote.subtotal)
        .bind(quote.tax_rate)
        .bind(quote.tax_amount)
        .bind(quote.total)
        .bind(&quote.logo_url)
        .bind(quote.font_size.to_string())
        .bind(&quote.footer_text)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Quote with id '{}' not found",
                quote.id
            )));
        }

        sqlx::query("DELETE FROM quote_items WHERE quote_id = $1")
            .bind(quote.id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, quote.id, &quote.items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete items first, then the header, in one transaction
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM quote_items WHERE quote_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Quote with id '{}' not found",
                id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn update_status(&self, id: Uuid, status: QuoteStatus) -> Result<()> {
        let result = sqlx::query("UPDATE quotes SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Quote with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    /// Mark a quote converted within an enclosing transaction, so quote and
    /// invoice change together or not at all
    pub async fn mark_converted(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        invoice_id: Uuid,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE quotes SET status = $2, converted_invoice_id = $3, updated_at = $4 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(QuoteStatus::Accepted.to_string())
        .bind(invoice_id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Quote with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}

async fn insert_header(tx: &mut Transaction<'_, Postgres>, quote: &Quote) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO quotes ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
         $13, $14, $15, $16, $17, $18)",
        HEADER_COLUMNS
    ))
    .bind(quote.id)
    .bind(&quote.number)
    .bind(quote.client_id)
    .bind(quote.issue_date)
    .bind(quote.expiry_date)
    .bind(&quote.notes)
    .bind(quote.status.to_string())
    .bind(quote.subtotal)
    .bind(quote.tax_rate)
    .bind(quote.tax_amount)
    .bind(quote.total)
    .bind(&quote.logo_url)
    .bind(quote.font_size.to_string())
    .bind(&quote.footer_text)
    .bind(quote.converted_invoice_id)
    .bind(quote.created_by)
    .bind(quote.created_at)
    .bind(quote.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    quote_id: Uuid,
    items: &[LineItem],
) -> Result<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO quote_items (id, quote_id, position, description, quantity, \
             unit_price, vat_rate, line_total) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::new_v4())
        .bind(quote_id)
        .bind(position as i32)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.vat_rate)
        .bind(round2(item.line_total()))
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

// Helper structs for database mapping

#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: Uuid,
    number: String,
    client_id: Uuid,
    issue_date: NaiveDate,
    expiry_date: Option<NaiveDate>,
    notes: Option<String>,
    status: String,
    subtotal: Decimal,
    tax_rate: Decimal,
    tax_amount: Decimal,
    total: Decimal,
    logo_url: Option<String>,
    font_size: String,
    footer_text: Option<String>,
    converted_invoice_id: Option<Uuid>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuoteRow {
    fn into_quote(self, items: Vec<LineItem>) -> Result<Quote> {
        use std::str::FromStr;

        let status = QuoteStatus::from_str(&self.status)
            .map_err(|e| AppError::internal(format!("Invalid status in database: {}", e)))?;
        let font_size = FontSize::from_str(&self.font_size)
            .map_err(|e| AppError::internal(format!("Invalid font size in database: {}", e)))?;

        Ok(Quote {
            id: self.id,
            number: self.number,
            client_id: self.client_id,
            issue_date: self.issue_date,
            expiry_date: self.expiry_date,
            notes: self.notes,
            status,
            subtotal: self.subtotal,
            tax_rate: self.tax_rate,
            tax_amount: self.tax_amount,
            total: self.total,
            logo_url: self.logo_url,
            font_size,
            footer_text: self.footer_text,
            converted_invoice_id: self.converted_invoice_id,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QuoteItemRow {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    vat_rate: Option<Decimal>,
}

impl QuoteItemRow {
    fn into_line_item(self) -> LineItem {
        LineItem {
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            vat_rate: self.vat_rate,
        }
    }
}
