use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::Value;

use super::{parse_body, ApiError};
use crate::authentication::{AccessPolicy, Operation};
use crate::configuration::DocumentSettings;
use crate::documents::DocumentStore;

#[tracing::instrument(name = "Serve settings", skip(request, documents, names, policy))]
pub async fn get_settings(
    request: HttpRequest,
    documents: web::Data<DocumentStore>,
    names: web::Data<DocumentSettings>,
    policy: web::Data<AccessPolicy>,
) -> Result<HttpResponse, ApiError> {
    policy.authorize(Operation::ReadSettings, request.headers())?;
    let settings = documents.get(&names.settings).await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// Stores the body verbatim as the new settings document.
#[tracing::instrument(name = "Replace settings", skip(request, body, documents, names, policy))]
pub async fn update_settings(
    request: HttpRequest,
    body: web::Payload,
    documents: web::Data<DocumentStore>,
    names: web::Data<DocumentSettings>,
    policy: web::Data<AccessPolicy>,
) -> Result<HttpResponse, ApiError> {
    policy.authorize(Operation::UpdateSettings, request.headers())?;
    let settings: Value = parse_body(body).await?;
    documents.set(&names.settings, &settings).await?;
    tracing::info!("Settings have been replaced");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Settings updated" })))
}
