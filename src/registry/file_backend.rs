use anyhow::Context;
use async_trait::async_trait;

use super::{StorageError, SubscriberBackend};
use crate::documents::DocumentStore;
use crate::domain::Subscriber;

/// Keeps the subscribers as a JSON array in one document of the store.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    documents: DocumentStore,
    document: String,
}

impl JsonFileBackend {
    pub fn new(documents: DocumentStore, document: impl Into<String>) -> Self {
        Self {
            documents,
            document: document.into(),
        }
    }
}

#[async_trait]
impl SubscriberBackend for JsonFileBackend {
    async fn list(&self) -> Result<Vec<Subscriber>, StorageError> {
        let value = self
            .documents
            .get(&self.document)
            .await
            .context("Failed to read the subscriber list.")?;
        let subscribers = serde_json::from_value(value)
            .context("The subscriber document is not a list of subscribers.")?;
        Ok(subscribers)
    }

    async fn append(&self, subscriber: &Subscriber) -> Result<(), StorageError> {
        let mut subscribers = self.list().await?;
        subscribers.push(subscriber.clone());
        self.replace_all(&subscribers).await
    }

    async fn replace_all(&self, subscribers: &[Subscriber]) -> Result<(), StorageError> {
        let value =
            serde_json::to_value(subscribers).context("Failed to serialize the subscriber list.")?;
        self.documents
            .set(&self.document, &value)
            .await
            .context("Failed to save the subscriber list.")?;
        Ok(())
    }
}
