/// Request extractors with API-shaped rejections
///
/// Axum's own `Json` rejects bodies with plain-text 415/422 responses;
/// [`ApiJson`] routes every rejection through [`ApiError`] instead, so a
/// missing or mistyped field is a 400 with the usual error body.

use axum::extract::FromRequest;
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body extractor that rejects with [`ApiError::BadRequest`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parses a path id; anything that is not a UUID cannot name a record
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{} not found", what)))
}
