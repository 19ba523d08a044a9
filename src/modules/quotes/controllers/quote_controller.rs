use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::middleware::CurrentUser;
use crate::modules::delivery::SendDocumentRequest;
use crate::modules::quotes::models::{QuoteDraft, SetQuoteStatusRequest};
use crate::modules::quotes::services::QuoteService;

/// Query parameters for listing quotes
#[derive(Debug, Deserialize)]
pub struct ListQuotesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Create a new quote
/// POST /quotes
pub async fn create_quote(
    service: web::Data<QuoteService>,
    user: CurrentUser,
    request: web::Json<QuoteDraft>,
) -> Result<HttpResponse, AppError> {
    let quote = service.create(request.into_inner(), user.0).await?;
    Ok(HttpResponse::Created().json(quote))
}

/// Get quote by ID, with line items
/// GET /quotes/{id}
pub async fn get_quote(
    service: web::Data<QuoteService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let quote = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(quote))
}

/// List quotes
/// GET /quotes
pub async fn list_quotes(
    service: web::Data<QuoteService>,
    query: web::Query<ListQuotesQuery>,
) -> Result<HttpResponse, AppError> {
    let quotes = service.list(query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(quotes))
}

/// Update a draft quote
/// PUT /quotes/{id}
pub async fn update_quote(
    service: web::Data<QuoteService>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
    request: web::Json<QuoteDraft>,
) -> Result<HttpResponse, AppError> {
    let quote = service
        .update(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(quote))
}

/// Delete a quote
/// DELETE /quotes/{id}
pub async fn delete_quote(
    service: web::Data<QuoteService>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change quote status along the allowed transitions
/// POST /quotes/{id}/status
pub async fn set_quote_status(
    service: web::Data<QuoteService>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
    request: web::Json<SetQuoteStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let quote = service
        .set_status(path.into_inner(), request.into_inner().status)
        .await?;
    Ok(HttpResponse::Ok().json(quote))
}

/// Download the quote as PDF
/// GET /quotes/{id}/pdf
pub async fn download_quote_pdf(
    service: web::Data<QuoteService>,
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

/// Email the quote to the client as a PDF attachment
/// POST /quotes/{id}/send
pub async fn send_quote(
    service: web::Data<QuoteService>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    request: web::Json<SendDocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let quote = service
        .send(path.into_inner(), request.into_inner(), user.0)
        .await?;
    Ok(HttpResponse::Ok().json(quote))
}

/// Convert a quote into a draft invoice
/// POST /quotes/{id}/convert
pub async fn convert_quote(
    service: web::Data<QuoteService>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.convert_to_invoice(path.into_inner(), user.0).await?;
    Ok(HttpResponse::Created().json(invoice))
}

/// Configure quote routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/quotes")
            .route("", web::post().to(create_quote))
            .route("", web::get().to(list_quotes))
            .route("/{id}", web::get().to(get_quote))
            .route("/{id}", web::put().to(update_quote))
            .route("/{id}", web::delete().to(delete_quote))
            .route("/{id}/status", web::post().to(set_quote_status))
            .route("/{id}/pdf", web::get().to(download_quote_pdf))
            .route("/{id}/send", web::post().to(send_quote))
            .route("/{id}/convert", web::post().to(convert_quote)),
    );
}
