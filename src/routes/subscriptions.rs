use std::convert::{TryFrom, TryInto};

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::{parse_body, ApiError};
use crate::authentication::{AccessPolicy, Operation};
use crate::domain::NewSubscriber;
use crate::registry::{RegistryError, SubscriberRegistry};

#[derive(Deserialize)]
pub struct SubscribeBody {
    name: Option<String>,
    email: Option<String>,
    categories: Option<Vec<String>>,
}

impl TryFrom<SubscribeBody> for NewSubscriber {
    type Error = String;

    fn try_from(body: SubscribeBody) -> Result<Self, Self::Error> {
        NewSubscriber::parse(body.name, body.email, body.categories)
    }
}

#[tracing::instrument(name = "Adding a new subscriber", skip(request, body, registry, policy))]
pub async fn subscribe(
    request: HttpRequest,
    body: web::Payload,
    registry: web::Data<SubscriberRegistry>,
    policy: web::Data<AccessPolicy>,
) -> Result<HttpResponse, ApiError> {
    policy.authorize(Operation::Subscribe, request.headers())?;
    let body: SubscribeBody = parse_body(body).await?;
    let new_subscriber: NewSubscriber = body.try_into().map_err(ApiError::ValidationError)?;
    match registry.create(new_subscriber).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Subscribed" }))),
        // Already being on the list is an outcome the frontend shows, not an error.
        Err(RegistryError::Duplicate(_)) => Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({ "message": "Email already registered" }))),
        Err(e) => Err(e.into()),
    }
}
