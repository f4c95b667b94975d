mod errors;
mod health_check;
mod news;
mod settings;
mod subscribers;
mod subscriptions;

pub use errors::ApiError;
pub use health_check::*;
pub use news::*;
pub use settings::*;
pub use subscribers::*;
pub use subscriptions::*;

use actix_web::web;
use serde::de::DeserializeOwned;

/// Largest request body the JSON endpoints accept.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Bodies are read and parsed inside the handlers, after the access check, so
/// an unauthorized caller never learns anything about the expected payload.
async fn parse_body<T: DeserializeOwned>(payload: web::Payload) -> Result<T, ApiError> {
    let body = payload
        .to_bytes_limited(MAX_BODY_BYTES)
        .await
        .map_err(|_| {
            ApiError::ValidationError(format!(
                "Request body is larger than {} bytes.",
                MAX_BODY_BYTES
            ))
        })?
        .map_err(|e| {
            ApiError::ValidationError(format!("Failed to read the request body: {}", e))
        })?;
    serde_json::from_slice(&body)
        .map_err(|e| ApiError::ValidationError(format!("Invalid JSON body: {}", e)))
}
