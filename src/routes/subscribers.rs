use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::{parse_body, ApiError};
use crate::authentication::{AccessPolicy, Operation};
use crate::domain::NewSubscriber;
use crate::export::render_csv;
use crate::registry::SubscriberRegistry;

#[derive(Deserialize)]
pub struct DeleteSubscriberBody {
    email: Option<String>,
}

/// Full replacement of the subscriber registered as `old_email`.
#[derive(Deserialize)]
pub struct UpdateSubscriberBody {
    old_email: Option<String>,
    name: Option<String>,
    email: Option<String>,
    categories: Option<Vec<String>>,
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::ValidationError(format!("'{}' is required.", field)))
}

#[tracing::instrument(name = "List subscribers", skip(request, registry, policy))]
pub async fn list_subscribers(
    request: HttpRequest,
    registry: web::Data<SubscriberRegistry>,
    policy: web::Data<AccessPolicy>,
) -> Result<HttpResponse, ApiError> {
    policy.authorize(Operation::ListSubscribers, request.headers())?;
    let subscribers = registry.list().await?;
    Ok(HttpResponse::Ok().json(subscribers))
}

#[tracing::instrument(name = "Delete a subscriber", skip(request, body, registry, policy))]
pub async fn delete_subscriber(
    request: HttpRequest,
    body: web::Payload,
    registry: web::Data<SubscriberRegistry>,
    policy: web::Data<AccessPolicy>,
) -> Result<HttpResponse, ApiError> {
    policy.authorize(Operation::DeleteSubscriber, request.headers())?;
    let body: DeleteSubscriberBody = parse_body(body).await?;
    let email = required(body.email, "email")?;
    registry.delete(&email).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Subscriber deleted" })))
}

#[tracing::instrument(name = "Update a subscriber", skip(request, body, registry, policy))]
pub async fn update_subscriber(
    request: HttpRequest,
    body: web::Payload,
    registry: web::Data<SubscriberRegistry>,
    policy: web::Data<AccessPolicy>,
) -> Result<HttpResponse, ApiError> {
    policy.authorize(Operation::UpdateSubscriber, request.headers())?;
    let body: UpdateSubscriberBody = parse_body(body).await?;
    let old_email = required(body.old_email, "old_email")?;
    let replacement = NewSubscriber::parse(body.name, body.email, body.categories)
        .map_err(ApiError::ValidationError)?;
    registry.update(&old_email, replacement).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Subscriber updated" })))
}

#[tracing::instrument(name = "Export subscribers as CSV", skip(request, registry, policy))]
pub async fn export_subscribers(
    request: HttpRequest,
    registry: web::Data<SubscriberRegistry>,
    policy: web::Data<AccessPolicy>,
) -> Result<HttpResponse, ApiError> {
    policy.authorize(Operation::ExportSubscribers, request.headers())?;
    let subscribers = registry.list().await?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename("subscribers.csv".into())],
        })
        .body(render_csv(&subscribers)))
}
