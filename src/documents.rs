use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum DocumentError {
    #[error("'{0}' is not a valid document name.")]
    InvalidName(String),
    #[error("Document '{name}' does not contain valid JSON.")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to access document '{name}'.")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl Debug for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Named JSON documents kept as `<name>.json` files in one directory.
///
/// Every read loads the whole file and every write replaces it. A document
/// that does not exist yet reads as an empty array.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    directory: PathBuf,
}

impl DocumentStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[tracing::instrument(name = "Read document", skip(self))]
    pub async fn get(&self, name: &str) -> Result<Value, DocumentError> {
        let path = self.path_for(name)?;
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("Document does not exist yet, serving an empty default");
                return Ok(Value::Array(Vec::new()));
            }
            Err(source) => {
                return Err(DocumentError::Io {
                    name: name.into(),
                    source,
                })
            }
        };
        serde_json::from_slice(&contents).map_err(|source| DocumentError::Malformed {
            name: name.into(),
            source,
        })
    }

    /// Replaces the document. The new contents are written next to the target
    /// and renamed over it, so a reader sees either the old or the new value.
    #[tracing::instrument(name = "Write document", skip(self, value))]
    pub async fn set(&self, name: &str, value: &Value) -> Result<(), DocumentError> {
        let path = self.path_for(name)?;
        let io_error = |source: std::io::Error| DocumentError::Io {
            name: name.into(),
            source,
        };
        let contents = serde_json::to_vec_pretty(value).map_err(|source| {
            DocumentError::Malformed {
                name: name.into(),
                source,
            }
        })?;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(io_error)?;
        let staging = self
            .directory
            .join(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()));
        tokio::fs::write(&staging, contents)
            .await
            .map_err(io_error)?;
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(io_error(e));
        }
        Ok(())
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, DocumentError> {
        let is_valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !is_valid {
            return Err(DocumentError::InvalidName(name.into()));
        }
        Ok(self.directory.join(format!("{}.json", name)))
    }
}
