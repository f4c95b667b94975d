mod file_backend;
mod spreadsheet_backend;

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use crate::domain::{NewSubscriber, NormalizedEmail, Subscriber};
use crate::utils::error_chain_fmt;

pub use file_backend::JsonFileBackend;
pub use spreadsheet_backend::{SpreadsheetBackend, SpreadsheetCredentials};

/// Failure of the storage behind the registry.
#[derive(thiserror::Error)]
#[error(transparent)]
pub struct StorageError(#[from] anyhow::Error);

impl Debug for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(thiserror::Error)]
pub enum RegistryError {
    #[error("{0} is already registered.")]
    Duplicate(String),
    #[error("No subscriber is registered with {0}.")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Debug for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Storage for subscriber records.
///
/// Implementations keep records in insertion order and never cache between
/// calls. `replace_at` and `remove_where` have whole-collection defaults;
/// backends that can address single records override them.
#[async_trait]
pub trait SubscriberBackend: Debug + Send + Sync {
    async fn list(&self) -> Result<Vec<Subscriber>, StorageError>;

    async fn append(&self, subscriber: &Subscriber) -> Result<(), StorageError>;

    async fn replace_all(&self, subscribers: &[Subscriber]) -> Result<(), StorageError>;

    async fn replace_at(
        &self,
        position: usize,
        subscriber: &Subscriber,
    ) -> Result<(), StorageError> {
        let mut subscribers = self.list().await?;
        let slot = subscribers
            .get_mut(position)
            .with_context(|| format!("No subscriber is stored at position {}.", position))?;
        *slot = subscriber.clone();
        self.replace_all(&subscribers).await
    }

    /// Returns how many records were removed.
    async fn remove_where(
        &self,
        predicate: &(dyn for<'s> Fn(&'s Subscriber) -> bool + Send + Sync),
    ) -> Result<usize, StorageError> {
        let mut subscribers = self.list().await?;
        let before = subscribers.len();
        subscribers.retain(|s| !predicate(s));
        let removed = before - subscribers.len();
        if removed > 0 {
            self.replace_all(&subscribers).await?;
        }
        Ok(removed)
    }
}

/// The mailing list. Owns the identity rule: two records are the same
/// subscriber when their emails match after trimming and lower-casing.
#[derive(Debug, Clone)]
pub struct SubscriberRegistry {
    backend: Arc<dyn SubscriberBackend>,
}

impl SubscriberRegistry {
    pub fn new(backend: Arc<dyn SubscriberBackend>) -> Self {
        Self { backend }
    }

    #[tracing::instrument(name = "List subscribers", skip(self))]
    pub async fn list(&self) -> Result<Vec<Subscriber>, RegistryError> {
        Ok(self.backend.list().await?)
    }

    #[tracing::instrument(
        name = "Register a new subscriber",
        skip(self, candidate),
        fields(subscriber_email = %candidate.email.as_ref())
    )]
    pub async fn create(&self, candidate: NewSubscriber) -> Result<(), RegistryError> {
        let email = candidate.email.normalized();
        let subscribers = self.backend.list().await?;
        if subscribers.iter().any(|s| s.has_email(&email)) {
            return Err(RegistryError::Duplicate(email.to_string()));
        }
        self.backend.append(&Subscriber::from(candidate)).await?;
        tracing::info!("New subscriber has been saved");
        Ok(())
    }

    /// Replaces all three fields of the subscriber found by `identifying_email`,
    /// keeping its position in the list.
    #[tracing::instrument(name = "Update a subscriber", skip(self, replacement))]
    pub async fn update(
        &self,
        identifying_email: &str,
        replacement: NewSubscriber,
    ) -> Result<(), RegistryError> {
        let target = NormalizedEmail::new(identifying_email);
        let new_email = replacement.email.normalized();
        let subscribers = self.backend.list().await?;
        let position = subscribers
            .iter()
            .position(|s| s.has_email(&target))
            .ok_or_else(|| RegistryError::NotFound(target.to_string()))?;
        let collides = subscribers
            .iter()
            .enumerate()
            .any(|(i, s)| i != position && s.has_email(&new_email));
        if collides {
            return Err(RegistryError::Duplicate(new_email.to_string()));
        }
        self.backend
            .replace_at(position, &Subscriber::from(replacement))
            .await?;
        Ok(())
    }

    /// Removes every record matching `email`; a miss is reported as not found.
    #[tracing::instrument(name = "Delete a subscriber", skip(self))]
    pub async fn delete(&self, email: &str) -> Result<usize, RegistryError> {
        let target = NormalizedEmail::new(email);
        let removed = self
            .backend
            .remove_where(&|s: &Subscriber| s.has_email(&target))
            .await?;
        if removed == 0 {
            return Err(RegistryError::NotFound(target.to_string()));
        }
        tracing::info!(removed, "Subscriber removed");
        Ok(removed)
    }
}
