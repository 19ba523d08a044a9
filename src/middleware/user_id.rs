use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::core::AppError;

/// Authenticated identity for the request, taken from the `X-User-Id`
/// header set by the auth gateway. Every insert records it as `created_by`;
/// write operations without it fail before touching the database.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = req
            .headers()
            .get("X-User-Id")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing X-User-Id header"))
            .and_then(|value| {
                Uuid::parse_str(value)
                    .map_err(|_| AppError::unauthorized("Invalid X-User-Id header"))
            })
            .map(CurrentUser);

        ready(result)
    }
}
