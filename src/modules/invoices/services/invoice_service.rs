// Invoice workflows: draft editing, rendering, delivery, status changes
// and payment bookkeeping. Totals are recomputed from the submitted items
// on every write.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::billing::{compute_totals, effective_rate, validated_items};
use crate::modules::clients::{Client, ClientRepository};
use crate::modules::delivery::{
    delivery_body, resolve_recipient, MailAttachment, Mailer, OutgoingMail, SendDocumentRequest,
};
use crate::modules::invoices::models::{
    Invoice, InvoiceDraft, InvoiceStatus, PaymentStatus, SetPaymentStatusRequest,
};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::render::{
    fetch_logo, render_document, DocumentKind, DocumentView, LogoImage,
};
use crate::modules::settings::{CompanySettings, SettingsRepository};

#[derive(Clone)]
pub struct InvoiceService {
    invoices: InvoiceRepository,
    clients: ClientRepository,
    settings: SettingsRepository,
    mailer: Arc<dyn Mailer>,
    http: reqwest::Client,
}

impl InvoiceService {
    pub fn new(
        invoices: InvoiceRepository,
        clients: ClientRepository,
        settings: SettingsRepository,
        mailer: Arc<dyn Mailer>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            invoices,
            clients,
            settings,
            mailer,
            http,
        }
    }

    pub async fn create(&self, draft: InvoiceDraft, created_by: Uuid) -> Result<Invoice> {
        let items = validated_items(draft.items.clone())?;
        self.ensure_client_exists(draft.client_id).await?;

        let tax_rate = effective_rate(draft.tax_enabled);
        let totals = compute_totals(&items, tax_rate);
        let now = Utc::now();

        let invoice = Invoice {
            id: Uuid::new_v4(),
            number: String::new(),
            client_id: draft.client_id,
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            notes: draft.notes,
            status: InvoiceStatus::Draft,
            payment_status: PaymentStatus::Pending,
            subtotal: totals.subtotal,
            tax_rate,
            tax_amount: totals.tax_amount,
            total: totals.total,
            logo_url: draft.logo_url,
            font_size: draft.font_size,
            footer_text: draft.footer_text,
            quote_id: None,
            created_by,
            created_at: now,
            updated_at: now,
            items,
        };

        let created = self.invoices.create(&invoice).await?;
        tracing::info!(invoice_id = %created.id, number = %created.number, "Invoice created");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<Invoice> {
        self.invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice with id '{}' not found", id)))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Invoice>> {
        self.invoices.list(limit, offset).await
    }

    /// Replace header fields and the full item set. Only drafts are
    /// editable; a sent invoice is a fiscal document.
    pub async fn update(&self, id: Uuid, draft: InvoiceDraft) -> Result<Invoice> {
        let mut invoice = self.get(id).await?;
        if invoice.status != InvoiceStatus::Draft {
            return Err(AppError::validation(format!(
                "Only draft invoices can be edited, this one is {}",
                invoice.status
            )));
        }

        let items = validated_items(draft.items.clone())?;
        self.ensure_client_exists(draft.client_id).await?;

        let tax_rate = effective_rate(draft.tax_enabled);
        let totals = compute_totals(&items, tax_rate);

        invoice.client_id = draft.client_id;
        invoice.issue_date = draft.issue_date;
        invoice.due_date = draft.due_date;
        invoice.notes = draft.notes;
        invoice.subtotal = totals.subtotal;
        invoice.tax_rate = tax_rate;
        invoice.tax_amount = totals.tax_amount;
        invoice.total = totals.total;
        invoice.logo_url = draft.logo_url;
        invoice.font_size = draft.font_size;
        invoice.footer_text = draft.footer_text;
        invoice.items = items;
        invoice.updated_at = Utc::now();

        self.invoices.update(&invoice).await?;
        Ok(invoice)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.invoices.delete(id).await?;
        tracing::info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }

    /// Advance status along the transition table
    pub async fn set_status(&self, id: Uuid, next: InvoiceStatus) -> Result<Invoice> {
        let mut invoice = self.get(id).await?;
        invoice.transition_status(next)?;
        self.invoices.update_status(id, next).await?;
        tracing::info!(invoice_id = %id, status = %next, "Invoice status changed");
        Ok(invoice)
    }

    /// Payment bookkeeping moves freely between its states
    pub async fn set_payment_status(
        &self,
        id: Uuid,
        request: SetPaymentStatusRequest,
    ) -> Result<Invoice> {
        let mut invoice = self.get(id).await?;
        invoice.payment_status = request.payment_status;
        invoice.updated_at = Utc::now();
        self.invoices
            .update_payment_status(id, request.payment_status)
            .await?;
        tracing::info!(
            invoice_id = %id,
            payment_status = %request.payment_status,
            "Invoice payment status changed"
        );
        Ok(invoice)
    }

    /// Render the invoice to PDF. Returns the suggested filename with the
    /// bytes.
    pub async fn render_pdf(&self, id: Uuid, account_id: Uuid) -> Result<(String, Vec<u8>)> {
        let invoice = self.get(id).await?;
        let client = self.load_client(invoice.client_id).await?;
        let company = self.load_company(account_id).await?;
        let logo = self.load_logo(invoice.logo_url.as_deref()).await;

        let view = invoice_view(&invoice, &client);
        let bytes = render_document(&view, &company, logo.as_ref())?;
        Ok((format!("{}.pdf", invoice.number), bytes))
    }

    /// Email the rendered invoice. Dispatch happens first; the draft ->
    /// sent transition is only persisted after the mail goes out.
    pub async fn send(
        &self,
        id: Uuid,
        request: SendDocumentRequest,
        account_id: Uuid,
    ) -> Result<Invoice> {
        let mut invoice = self.get(id).await?;
        let client = self.load_client(invoice.client_id).await?;
        let company = self.load_company(account_id).await?;

        let recipient = resolve_recipient(request.to, client.email.as_deref())?;
        let logo = self.load_logo(invoice.logo_url.as_deref()).await;
        let view = invoice_view(&invoice, &client);
        let bytes = render_document(&view, &company, logo.as_ref())?;

        let subject = request.subject.unwrap_or_else(|| {
            format!("Invoice {} from {}", invoice.number, company.company_name)
        });
        let html_body = delivery_body(request.message.as_deref(), "invoice", &invoice.number);

        self.mailer
            .send(OutgoingMail {
                to: recipient,
                subject,
                html_body,
                attachment: Some(MailAttachment {
                    filename: format!("{}.pdf", invoice.number),
                    bytes,
                }),
            })
            .await?;

        if invoice.status == InvoiceStatus::Draft {
            invoice.transition_status(InvoiceStatus::Sent)?;
            self.invoices.update_status(id, InvoiceStatus::Sent).await?;
        }

        Ok(invoice)
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

fn invoice_view(invoice: &Invoice, client: &Client) -> DocumentView {
    DocumentView {
        kind: DocumentKind::Invoice,
        number: invoice.number.clone(),
        issue_date: invoice.issue_date,
        secondary_date: invoice.due_date,
        client: client.into(),
        items: invoice.items.clone(),
        totals: invoice.totals(),
        tax_rate: invoice.tax_rate,
        logo_url: invoice.logo_url.clone(),
        font_size: invoice.font_size,
        footer_text: invoice.footer_text.clone(),
    }
}
