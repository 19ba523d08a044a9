// Quote workflows: draft editing, rendering, delivery, status changes and
// conversion into an invoice. Totals are recomputed from the submitted
// items on every write; stored totals are never trusted from the client.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::billing::{compute_totals, effective_rate, next_number, validated_items};
use crate::modules::clients::{Client, ClientRepository};
use crate::modules::delivery::{
    delivery_body, resolve_recipient, MailAttachment, Mailer, OutgoingMail, SendDocumentRequest,
};
use crate::modules::invoices::models::{Invoice, InvoiceStatus, PaymentStatus, INVOICE_NUMBER_PREFIX};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::quotes::models::{Quote, QuoteDraft, QuoteStatus};
use crate::modules::quotes::repositories::QuoteRepository;
use crate::modules::render::{
    fetch_logo, render_document, DocumentKind, DocumentView, LogoImage,
};
use crate::modules::settings::{CompanySettings, SettingsRepository};

/// Attempts at allocating an invoice number during conversion
const CONVERT_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct QuoteService {
    quotes: QuoteRepository,
    invoices: InvoiceRepository,
    clients: ClientRepository,
    settings: SettingsRepository,
    mailer: Arc<dyn Mailer>,
    http: reqwest::Client,
}

impl QuoteService {
    pub fn new(
        quotes: QuoteRepository,
        invoices: InvoiceRepository,
        clients: ClientRepository,
        settings: SettingsRepository,
        mailer: Arc<dyn Mailer>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            quotes,
            invoices,
            clients,
            settings,
            mailer,
            http,
        }
    }

    pub async fn create(&self, draft: QuoteDraft, created_by: Uuid) -> Result<Quote> {
        let items = validated_items(draft.items.clone())?;
        self.ensure_client_exists(draft.client_id).await?;

        let tax_rate = effective_rate(draft.tax_enabled);
        let totals = compute_totals(&items, tax_rate);
        let now = Utc::now();

        let quote = Quote {
            id: Uuid::new_v4(),
            number: String::new(),
            client_id: draft.client_id,
            issue_date: draft.issue_date,
            expiry_date: draft.expiry_date,
            notes: draft.notes,
            status: QuoteStatus::Draft,
            subtotal: totals.subtotal,
            tax_rate,
            tax_amount: totals.tax_amount,
            total: totals.total,
            logo_url: draft.logo_url,
            font_size: draft.font_size,
            footer_text: draft.footer_text,
            converted_invoice_id: None,
            created_by,
            created_at: now,
            updated_at: now,
            items,
        };

        let created = self.quotes.create(&quote).await?;
        tracing::info!(quote_id = %created.id, number = %created.number, "Quote created");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<Quote> {
        self.quotes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Quote with id '{}' not found", id)))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Quote>> {
        self.quotes.list(limit, offset).await
    }

    /// Replace header fields and the full item set. Only drafts are
    /// editable; a sent quote is a commitment to the client.
    pub async fn update(&self, id: Uuid, draft: QuoteDraft) -> Result<Quote> {
        let mut quote = self.get(id).await?;
        if quote.status != QuoteStatus::Draft {
            return Err(AppError::validation(format!(
                "Only draft quotes can be edited, this one is {}",
                quote.status
            )));
        }

        let items = validated_items(draft.items.clone())?;
        self.ensure_client_exists(draft.client_id).await?;

        let tax_rate = effective_rate(draft.tax_enabled);
        let totals = compute_totals(&items, tax_rate);

        quote.client_id = draft.client_id;
        quote.issue_date = draft.issue_date;
        quote.expiry_date = draft.expiry_date;
        quote.notes = draft.notes;
        quote.subtotal = totals.subtotal;
        quote.tax_rate = tax_rate;
        quote.tax_amount = totals.tax_amount;
        quote.total = totals.total;
        quote.logo_url = draft.logo_url;
        quote.font_size = draft.font_size;
        quote.footer_text = draft.footer_text;
        quote.items = items;
        quote.updated_at = Utc::now();

        self.quotes.update(&quote).await?;
        Ok(quote)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.quotes.delete(id).await?;
        tracing::info!(quote_id = %id, "Quote deleted");
        Ok(())
    }

    /// Advance status along the transition table
    pub async fn set_status(&self, id: Uuid, next: QuoteStatus) -> Result<Quote> {
        let mut quote = self.get(id).await?;
        quote.transition_status(next)?;
        self.quotes.update_status(id, next).await?;
        tracing::info!(quote_id = %id, status = %next, "Quote status changed");
        Ok(quote)
    }

    /// Render the quote to PDF. Returns the suggested filename with the
    /// bytes.
    pub async fn render_pdf(&self, id: Uuid, account_id: Uuid) -> Result<(String, Vec<u8>)> {
        let quote = self.get(id).await?;
        let client = self.load_client(quote.client_id).await?;
        let company = self.load_company(account_id).await?;
        let logo = self.load_logo(quote.logo_url.as_deref()).await;

        let view = quote_view(&quote, &client);
        let bytes = render_document(&view, &company, logo.as_ref())?;
        Ok((format!("{}.pdf", quote.number), bytes))
    }

    /// Email the rendered quote. Dispatch happens first; the draft -> sent
    /// transition is only persisted after the mail goes out, so a delivery
    /// failure leaves the quote untouched.
    pub async fn send(
        &self,
        id: Uuid,
        request: SendDocumentRequest,
        account_id: Uuid,
    ) -> Result<Quote> {
        let mut quote = self.get(id).await?;
        let client = self.load_client(quote.client_id).await?;
        let company = self.load_company(account_id).await?;

        let recipient = resolve_recipient(request.to, client.email.as_deref())?;
        let logo = self.load_logo(quote.logo_url.as_deref()).await;
        let view = quote_view(&quote, &client);
        let bytes = render_document(&view, &company, logo.as_ref())?;

        let subject = request
            .subject
            .unwrap_or_else(|| format!("Quote {} from {}", quote.number, company.company_name));
        let html_body = delivery_body(request.message.as_deref(), "quote", &quote.number);

        self.mailer
            .send(OutgoingMail {
                to: recipient,
                subject,
                html_body,
                attachment: Some(MailAttachment {
                    filename: format!("{}.pdf", quote.number),
                    bytes,
                }),
            })
            .await?;

        if quote.status == QuoteStatus::Draft {
            quote.transition_status(QuoteStatus::Sent)?;
            self.quotes.update_status(id, QuoteStatus::Sent).await?;
        }

        Ok(quote)
    }

    /// Convert an accepted-or-pending quote into a draft invoice. The new
    /// invoice and the quote's converted marker are committed in one
    /// transaction; the quote ends up accepted either way.
    pub async fn convert_to_invoice(&self, id: Uuid, created_by: Uuid) -> Result<Invoice> {
        let quote = self.get(id).await?;

        if let Some(invoice_id) = quote.converted_invoice_id {
            return Err(AppError::validation(format!(
                "Quote {} was already converted to invoice '{}'",
                quote.number, invoice_id
            )));
        }
        if quote.status == QuoteStatus::Rejected {
            return Err(AppError::validation(format!(
                "Rejected quote {} cannot be converted",
                quote.number
            )));
        }

        let mut last_error: Option<AppError> = None;

        for _ in 0..CONVERT_ATTEMPTS {
            let mut tx = self.quotes.pool().begin().await?;

            let latest = self.invoices.latest_number_in_tx(&mut tx).await?;
            let number = next_number(INVOICE_NUMBER_PREFIX, latest.as_deref())?;
            let invoice = invoice_from_quote(&quote, number, created_by);

            match self.invoices.insert_in_tx(&mut tx, &invoice).await {
                Ok(()) => {
                    self.quotes.mark_converted(&mut tx, quote.id, invoice.id).await?;
                    tx.commit().await?;
                    tracing::info!(
                        quote_id = %quote.id,
                        invoice_id = %invoice.id,
                        number = %invoice.number,
                        "Quote converted to invoice"
                    );
                    return Ok(invoice);
                }
                Err(AppError::Database(e))
                    if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) =>
                {
                    tracing::warn!(
                        number = %invoice.number,
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

    async fn ensure_client_exists(&self, client_id: Uuid) -> Result<()> {
        self.load_client(client_id).await.map(|_| ())
    }

    async fn load_client(&self, client_id: Uuid) -> Result<Client> {
        self.clients.find_by_id(client_id).await?.ok_or_else(|| {
            AppError::validation(format!("Client with id '{}' does not exist", client_id))
        })
    }

    async fn load_company(&self, account_id: Uuid) -> Result<CompanySettings> {
        Ok(self
            .settings
            .find(account_id)
            .await?
            .unwrap_or_else(|| CompanySettings::empty(account_id)))
    }

    async fn load_logo(&self, url: Option<&str>) -> Option<LogoImage> {
        match url {
            Some(url) => fetch_logo(&self.http, url).await,
            None => None,
        }
    }
}

fn quote_view(quote: &Quote, client: &Client) -> DocumentView {
    DocumentView {
        kind: DocumentKind::Quote,
        number: quote.number.clone(),
        issue_date: quote.issue_date,
        secondary_date: quote.expiry_date,
        client: client.into(),
        items: quote.items.clone(),
        totals: quote.totals(),
        tax_rate: quote.tax_rate,
        logo_url: quote.logo_url.clone(),
        font_size: quote.font_size,
        footer_text: quote.footer_text.clone(),
    }
}

/// Copies the commercial content of a quote into a fresh draft invoice
fn invoice_from_quote(quote: &Quote, number: String, created_by: Uuid) -> Invoice {
    let now = Utc::now();
    Invoice {
        id: Uuid::new_v4(),
        number,
        client_id: quote.client_id,
        issue_date: now.date_naive(),
        due_date: None,
        notes: quote.notes.clone(),
        status: InvoiceStatus::Draft,
        payment_status: PaymentStatus::Pending,
        subtotal: quote.subtotal,
        tax_rate: quote.tax_rate,
        tax_amount: quote.tax_amount,
        total: quote.total,
        logo_url: quote.logo_url.clone(),
        font_size: quote.font_size,
        footer_text: quote.footer_text.clone(),
        quote_id: Some(quote.id),
        created_by,
        created_at: now,
        updated_at: now,
        items: quote.items.clone(),
    }
}
