use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::clients::models::{Client, ClientInput};

const SELECT_COLUMNS: &str = "id, name, business_name, address, email, vat_number, tax_code, \
     pec, sdi_code, created_by, created_at, updated_at";

/// Repository for client database operations
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: ClientInput, created_by: Uuid) -> Result<Client> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("Client name cannot be empty"));
        }

        let now = Utc::now();
        let client = sqlx::query_as::<_, Client>(&format!(
            "INSERT INTO clients ({columns}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {columns}",
            columns = SELECT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.business_name)
        .bind(&input.address)
        .bind(&input.email)
        .bind(&input.vat_number)
        .bind(&input.tax_code)
        .bind(&input.pec)
        .bind(&input.sdi_code)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM clients WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM clients ORDER BY name LIMIT $1 OFFSET $2",
            SELECT_COLUMNS
        ))
        .bind(limit.min(100))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn update(&self, id: Uuid, input: ClientInput) -> Result<Client> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("Client name cannot be empty"));
        }

        let client = sqlx::query_as::<_, Client>(&format!(
            "UPDATE clients SET name = $2, business_name = $3, address = $4, email = $5, \
             vat_number = $6, tax_code = $7, pec = $8, sdi_code = $9, updated_at = $10 \
             WHERE id = $1 RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.business_name)
        .bind(&input.address)
        .bind(&input.email)
        .bind(&input.vat_number)
        .bind(&input.tax_code)
        .bind(&input.pec)
        .bind(&input.sdi_code)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Client with id '{}' not found", id)))?;

        Ok(client)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Client with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
