use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::authentication::AuthError;
use crate::documents::DocumentError;
use crate::registry::RegistryError;
use crate::utils::error_chain_fmt;

/// Every failure a handler can report. The body is always `{"error": ...}`.
#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    AuthError(#[from] AuthError),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    DuplicateError(String),
    #[error(transparent)]
    DocumentError(#[from] DocumentError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Duplicate(_) => ApiError::DuplicateError(e.to_string()),
            RegistryError::NotFound(_) => ApiError::NotFoundError(e.to_string()),
            RegistryError::Storage(source) => ApiError::UnexpectedError(source.into()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::DuplicateError(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthError(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFoundError(_) => StatusCode::NOT_FOUND,
            ApiError::DocumentError(_) | ApiError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
