// Postgres persistence for the invoice aggregate. Same transactional
// discipline as the quote repository, plus transaction-scoped entry points
// so a quote conversion can write the invoice and mark the quote in one
// commit.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::money::round2;
use crate::core::{AppError, Result};
use crate::modules::billing::{next_number, LineItem};
use crate::modules::invoices::models::{
    Invoice, InvoiceStatus, PaymentStatus, INVOICE_NUMBER_PREFIX,
};
use crate::modules::render::FontSize;

const HEADER_COLUMNS: &str = "id, number, client_id, issue_date, due_date, notes, status, \
     payment_status, subtotal, tax_rate, tax_amount, total, logo_url, font_size, footer_text, \
     quote_id, created_by, created_at, updated_at";

/// Attempts at allocating a unique sequential number before giving up
const NUMBER_ALLOC_ATTEMPTS: u32 = 3;

/// Repository for invoice database operations
#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an invoice with its line items in one transaction, allocating
    /// the next sequential number. Lost number races retry against the
    /// unique index.
    pub async fn create(&self, invoice: &Invoice) -> Result<Invoice> {
        let mut last_error: Option<AppError> = None;

        for _ in 0..NUMBER_ALLOC_ATTEMPTS {
            let mut tx = self.pool.begin().await?;

            let latest = self.latest_number_in_tx(&mut tx).await?;
            let mut created = invoice.clone();
            created.number = next_number(INVOICE_NUMBER_PREFIX, latest.as_deref())?;

            match self.insert_in_tx(&mut tx, &created).await {
                Ok(()) => {
                    tx.commit().await?;
                    return Ok(created);
                }
                Err(AppError::Database(e)) if is_unique_violation(&e) => {
                    tracing::warn!(
                        number = %created.number,
                        "Invoice number already taken, retrying allocation"
                    );
                    last_error = Some(AppError::Database(e));
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::NumberGeneration("Could not allocate an invoice number".to_string())
        }))
    }

    /// Latest persisted invoice number, read inside the caller's transaction.
    /// LENGTH sorts before the lexicographic tiebreak so INV-1000 beats
    /// INV-999 when timestamps collide.
    pub async fn latest_number_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Option<String>> {
        let latest = sqlx::query_scalar(
            "SELECT number FROM invoices \
             ORDER BY created_at DESC, LENGTH(number) DESC, number DESC LIMIT 1",
        )
        .fetch_optional(&mut **tx)
        .await?;
        Ok(latest)
    }

    /// Insert header and items within an enclosing transaction. The number
    /// must already be set; callers own retry on unique violations.
    pub async fn insert_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        invoice: &Invoice,
    ) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO invoices ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, \
             $12, $13, $14, $15, $16, $17, $18, $19)",
            HEADER_COLUMNS
        ))
        .bind(invoice.id)
        .bind(&invoice.number)
        .bind(invoice.client_id)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(&invoice.notes)
        .bind(invoice.status.to_string())
        .bind(invoice.payment_status.to_string())
        .bind(invoice.subtotal)
        .bind(invoice.tax_rate)
        .bind(invoice.tax_amount)
        .bind(invoice.total)
        .bind(&invoice.logo_url)
        .bind(invoice.font_size.to_string())
        .bind(&invoice.footer_text)
        .bind(invoice.quote_id)
        .bind(invoice.created_by)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut **tx)
        .await?;

        insert_items(tx, invoice.id, &invoice.items).await?;
        Ok(())
    }

    /// Find an invoice by id, including its line items
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoices WHERE id = $1",
            HEADER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, InvoiceItemRow>(
            "SELECT description, quantity, unit_price, vat_rate FROM invoice_items \
             WHERE invoice_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_invoice(
            items
                .into_iter()
                .map(InvoiceItemRow::into_line_item)
                .collect(),
        )?))
    }

    /// List invoices, newest first, without line items
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoices ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            HEADER_COLUMNS
        ))
        .bind(limit.min(100))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_invoice(vec![]))
            .collect()
    }

    /// Replace the header fields and the full item set in one transaction
    pub async fn update(&self, invoice: &Invoice) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE invoices SET client_id = $2, issue_date = $3, due_date = $4, notes = $5, \
             subtotal = $6, tax_rate = $7, tax_amount = $8, total = $9, logo_url = $10, \
             font_size = $11, footer_text = $12, updated_at = $13 \
             WHERE id = $1",
        )
        .bind(invoice.id)
        .bind(invoice.client_id)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(&invoice.notes)
        .bind(invoice.subtotal)
        .bind(invoice.tax_rate)
        .bind(invoice.tax_amount)
        .bind(invoice.total)
        .bind(&invoice.logo_url)
        .bind(invoice.font_size.to_string())
        .bind(&invoice.footer_text)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice with id '{}' not found",
                invoice.id
            )));
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(invoice.id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, invoice.id, &invoice.items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete items first, then the header, in one transaction
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice with id '{}' not found",
                id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn update_status(&self, id: Uuid, status: InvoiceStatus) -> Result<()> {
        let result = sqlx::query("UPDATE invoices SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    pub async fn update_payment_status(&self, id: Uuid, payment: PaymentStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE invoices SET payment_status = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(payment.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: Uuid,
    items: &[LineItem],
) -> Result<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO invoice_items (id, invoice_id, position, description, quantity, \
             unit_price, vat_rate, line_total) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::new_v4())
        .bind(invoice_id)
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
struct InvoiceRow {
    id: Uuid,
    number: String,
    client_id: Uuid,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    notes: Option<String>,
    status: String,
    payment_status: String,
    subtotal: Decimal,
    tax_rate: Decimal,
    tax_amount: Decimal,
    total: Decimal,
    logo_url: Option<String>,
    font_size: String,
    footer_text: Option<String>,
    quote_id: Option<Uuid>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    fn into_invoice(self, items: Vec<LineItem>) -> Result<Invoice> {
        use std::str::FromStr;

        let status = InvoiceStatus::from_str(&self.status)
            .map_err(|e| AppError::internal(format!("Invalid status in database: {}", e)))?;
        let payment_status = PaymentStatus::from_str(&self.payment_status).map_err(|e| {
            AppError::internal(format!("Invalid payment status in database: {}", e))
        })?;
        let font_size = FontSize::from_str(&self.font_size)
            .map_err(|e| AppError::internal(format!("Invalid font size in database: {}", e)))?;

        Ok(Invoice {
            id: self.id,
            number: self.number,
            client_id: self.client_id,
            issue_date: self.issue_date,
            due_date: self.due_date,
            notes: self.notes,
            status,
            payment_status,
            subtotal: self.subtotal,
            tax_rate: self.tax_rate,
            tax_amount: self.tax_amount,
            total: self.total,
            logo_url: self.logo_url,
            font_size,
            footer_text: self.footer_text,
            quote_id: self.quote_id,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceItemRow {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    vat_rate: Option<Decimal>,
}

impl InvoiceItemRow {
    fn into_line_item(self) -> LineItem {
        LineItem {
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            vat_rate: self.vat_rate,
        }
    }
}
