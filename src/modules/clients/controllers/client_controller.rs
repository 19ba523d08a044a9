use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::middleware::CurrentUser;
use crate::modules::clients::models::ClientInput;
use crate::modules::clients::repositories::ClientRepository;

/// Query parameters for listing clients
#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Create a new client
/// POST /clients
pub async fn create_client(
    repo: web::Data<ClientRepository>,
    user: CurrentUser,
    request: web::Json<ClientInput>,
) -> Result<HttpResponse, AppError> {
    let client = repo.create(request.into_inner(), user.0).await?;
    Ok(HttpResponse::Created().json(client))
}

/// Get client by ID
/// GET /clients/{id}
pub async fn get_client(
    repo: web::Data<ClientRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let client = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Client with id '{}' not found", id)))?;
    Ok(HttpResponse::Ok().json(client))
}

/// List clients
/// GET /clients
pub async fn list_clients(
    repo: web::Data<ClientRepository>,
    query: web::Query<ListClientsQuery>,
) -> Result<HttpResponse, AppError> {
    let clients = repo.list(query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(clients))
}

/// Update a client
/// PUT /clients/{id}
pub async fn update_client(
    repo: web::Data<ClientRepository>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
    request: web::Json<ClientInput>,
) -> Result<HttpResponse, AppError> {
    let client = repo.update(path.into_inner(), request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(client))
}

/// Delete a client
/// DELETE /clients/{id}
pub async fn delete_client(
    repo: web::Data<ClientRepository>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    repo.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure client routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/clients")
            .route("", web::post().to(create_client))
            .route("", web::get().to(list_clients))
            .route("/{id}", web::get().to(get_client))
            .route("/{id}", web::put().to(update_client))
            .route("/{id}", web::delete().to(delete_client)),
    );
}
