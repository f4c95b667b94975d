use actix_web::{web, HttpRequest, HttpResponse};

use super::ApiError;
use crate::authentication::{AccessPolicy, Operation};
use crate::configuration::DocumentSettings;
use crate::documents::DocumentStore;

/// The news document is written by the feed ingestion job; this service only
/// reads it.
#[tracing::instrument(name = "Serve news", skip(request, documents, names, policy))]
pub async fn news(
    request: HttpRequest,
    documents: web::Data<DocumentStore>,
    names: web::Data<DocumentSettings>,
    policy: web::Data<AccessPolicy>,
) -> Result<HttpResponse, ApiError> {
    policy.authorize(Operation::ReadNews, request.headers())?;
    let news = documents.get(&names.news).await?;
    Ok(HttpResponse::Ok().json(news))
}
