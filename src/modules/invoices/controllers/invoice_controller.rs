use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::middleware::CurrentUser;
use crate::modules::delivery::SendDocumentRequest;
use crate::modules::invoices::models::{
    InvoiceDraft, SetInvoiceStatusRequest, SetPaymentStatusRequest,
};
use crate::modules::invoices::services::InvoiceService;

/// Query parameters for listing invoices
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Create a new invoice
/// POST /invoices
pub async fn create_invoice(
    service: web::Data<InvoiceService>,
    user: CurrentUser,
    request: web::Json<InvoiceDraft>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.create(request.into_inner(), user.0).await?;
    Ok(HttpResponse::Created().json(invoice))
}

/// Get invoice by ID, with line items
/// GET /invoices/{id}
pub async fn get_invoice(
    service: web::Data<InvoiceService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// List invoices
/// GET /invoices
pub async fn list_invoices(
    service: web::Data<InvoiceService>,
    query: web::Query<ListInvoicesQuery>,
) -> Result<HttpResponse, AppError> {
    let invoices = service.list(query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(invoices))
}

/// Update a draft invoice
/// PUT /invoices/{id}
pub async fn update_invoice(
    service: web::Data<InvoiceService>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
    request: web::Json<InvoiceDraft>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .update(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// Delete an invoice
/// DELETE /invoices/{id}
pub async fn delete_invoice(
    service: web::Data<InvoiceService>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change invoice status along the allowed transitions
/// POST /invoices/{id}/status
pub async fn set_invoice_status(
    service: web::Data<InvoiceService>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
    request: web::Json<SetInvoiceStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .set_status(path.into_inner(), request.into_inner().status)
        .await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// Change payment bookkeeping status
/// POST /invoices/{id}/payment-status
pub async fn set_payment_status(
    service: web::Data<InvoiceService>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
    request: web::Json<SetPaymentStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .set_payment_status(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// Download the invoice as PDF
/// GET /invoices/{id}/pdf
pub async fn download_invoice_pdf(
    service: web::Data<InvoiceService>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (filename, bytes) = service.render_pdf(path.into_inner(), user.0).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(bytes))
}

/// Email the invoice to the client as a PDF attachment
/// POST /invoices/{id}/send
pub async fn send_invoice(
    service: web::Data<InvoiceService>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    request: web::Json<SendDocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .send(path.into_inner(), request.into_inner(), user.0)
        .await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// Configure invoice routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/invoices")
            .route("", web::post().to(create_invoice))
            .route("", web::get().to(list_invoices))
            .route("/{id}", web::get().to(get_invoice))
            .route("/{id}", web::put().to(update_invoice))
            .route("/{id}", web::delete().to(delete_invoice))
            .route("/{id}/status", web::post().to(set_invoice_status))
            .route("/{id}/payment-status", web::post().to(set_payment_status))
            .route("/{id}/pdf", web::get().to(download_invoice_pdf))
            .route("/{id}/send", web::post().to(send_invoice)),
    );
}
