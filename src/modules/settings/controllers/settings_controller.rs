use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::middleware::CurrentUser;
use crate::modules::settings::models::CompanySettingsInput;
use crate::modules::settings::repositories::SettingsRepository;

/// Get the company profile for the current account
/// GET /settings
pub async fn get_settings(
    repo: web::Data<SettingsRepository>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let settings = repo
        .find(user.0)
        .await?
        .ok_or_else(|| AppError::not_found("Company settings not configured"))?;
    Ok(HttpResponse::Ok().json(settings))
}

/// Create or replace the company profile
/// PUT /settings
pub async fn put_settings(
    repo: web::Data<SettingsRepository>,
    user: CurrentUser,
    request: web::Json<CompanySettingsInput>,
) -> Result<HttpResponse, AppError> {
    let settings = repo.upsert(user.0, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// Configure settings routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .route("", web::get().to(get_settings))
            .route("", web::put().to(put_settings)),
    );
}
