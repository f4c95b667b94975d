use std::collections::HashSet;
use std::fmt::Debug;

use actix_web::http::header::HeaderMap;
use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized.")]
    InvalidCredentialsError(#[source] anyhow::Error),
}

impl Debug for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Every operation exposed over HTTP. The access policy decides per
/// operation whether the shared secret is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    ReadNews,
    ReadSettings,
    UpdateSettings,
    Subscribe,
    ListSubscribers,
    DeleteSubscriber,
    UpdateSubscriber,
    ExportSubscribers,
}

impl Operation {
    /// Operations gated when the configuration does not say otherwise.
    pub fn administrative() -> Vec<Operation> {
        vec![
            Operation::UpdateSettings,
            Operation::ListSubscribers,
            Operation::DeleteSubscriber,
            Operation::UpdateSubscriber,
            Operation::ExportSubscribers,
        ]
    }
}

/// The credential a caller presented.
pub struct AuthToken(Secret<String>);

impl AuthToken {
    pub fn new(token: String) -> Self {
        Self(Secret::new(token))
    }
}

#[tracing::instrument(name = "Get shared secret from authorization header", skip(headers))]
pub fn shared_secret_from_headers(headers: &HeaderMap) -> Result<AuthToken, anyhow::Error> {
    let header_value = headers
        .get("Authorization")
        .context("The 'Authorization' header is missing.")?
        .to_str()
        .context("The 'Authorization' header was not a valid UTF-8 string.")?;
    Ok(AuthToken::new(header_value.to_string()))
}

/// Shared-secret gate in front of the operations listed in `gated`.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    shared_secret: Secret<String>,
    gated: HashSet<Operation>,
}

impl AccessPolicy {
    pub fn new(shared_secret: Secret<String>, gated: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            shared_secret,
            gated: gated.into_iter().collect(),
        }
    }

    pub fn is_gated(&self, operation: Operation) -> bool {
        self.gated.contains(&operation)
    }

    #[tracing::instrument(name = "Check access", skip(self, headers))]
    pub fn authorize(&self, operation: Operation, headers: &HeaderMap) -> Result<(), AuthError> {
        if !self.is_gated(operation) {
            return Ok(());
        }
        let token =
            shared_secret_from_headers(headers).map_err(AuthError::InvalidCredentialsError)?;
        self.validate(&token)
    }

    pub fn validate(&self, token: &AuthToken) -> Result<(), AuthError> {
        let expected = self.shared_secret.expose_secret();
        // An unset secret must not let an empty header through.
        if expected.is_empty() {
            return Err(AuthError::InvalidCredentialsError(anyhow::anyhow!(
                "No shared secret is configured."
            )));
        }
        if constant_time_eq(expected.as_bytes(), token.0.expose_secret().as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentialsError(anyhow::anyhow!(
                "The shared secret does not match."
            )))
        }
    }
}

/// Always walks the longer of the two inputs, so neither the position of the
/// first difference nor a length mismatch ends the comparison early.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let length = a.len().max(b.len());
    let mut difference = a.len() ^ b.len();
    for i in 0..length {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        difference |= usize::from(x ^ y);
    }
    difference == 0
}
