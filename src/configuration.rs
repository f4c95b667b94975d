use std::convert::{TryFrom, TryInto};
use std::path::PathBuf;
use std::sync::Arc;

use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::authentication::{AccessPolicy, Operation};
use crate::documents::DocumentStore;
use crate::registry::{
    JsonFileBackend, SpreadsheetBackend, SpreadsheetCredentials, SubscriberBackend,
};

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone)]
pub struct DocumentSettings {
    pub directory: PathBuf,
    pub news: String,
    pub settings: String,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackendKind {
    File,
    Spreadsheet,
}

#[derive(Deserialize, Clone)]
pub struct FileRegistrySettings {
    pub document: String,
}

#[derive(Deserialize, Clone)]
pub struct SpreadsheetSettings {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    // Numeric id of the sheet tab, needed to delete rows
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub sheet_id: u64,
    pub access_token: Option<Secret<String>>,
    pub access_token_file: Option<PathBuf>,
    pub timeout_milliseconds: u64,
}

impl SpreadsheetSettings {
    pub fn credentials(&self) -> SpreadsheetCredentials {
        match (&self.access_token, &self.access_token_file) {
            (Some(token), _) => SpreadsheetCredentials::Token(token.clone()),
            (None, Some(path)) => SpreadsheetCredentials::File(path.clone()),
            (None, None) => SpreadsheetCredentials::Missing,
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Deserialize, Clone)]
pub struct RegistrySettings {
    pub backend: RegistryBackendKind,
    pub file: FileRegistrySettings,
    pub spreadsheet: SpreadsheetSettings,
}

impl RegistrySettings {
    pub fn build_backend(
        &self,
        documents: &DocumentStore,
    ) -> Result<Arc<dyn SubscriberBackend>, anyhow::Error> {
        let backend: Arc<dyn SubscriberBackend> = match self.backend {
            RegistryBackendKind::File => Arc::new(JsonFileBackend::new(
                documents.clone(),
                self.file.document.clone(),
            )),
            RegistryBackendKind::Spreadsheet => {
                let spreadsheet = &self.spreadsheet;
                Arc::new(SpreadsheetBackend::new(
                    spreadsheet.base_url.clone(),
                    spreadsheet.spreadsheet_id.clone(),
                    spreadsheet.sheet_name.clone(),
                    spreadsheet.sheet_id,
                    spreadsheet.credentials(),
                    spreadsheet.timeout(),
                )?)
            }
        };
        Ok(backend)
    }
}

#[derive(Deserialize, Clone)]
pub struct AccessSettings {
    pub shared_secret: Secret<String>,
    #[serde(default = "Operation::administrative")]
    pub gated_operations: Vec<Operation>,
}

impl AccessSettings {
    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::new(
            self.shared_secret.clone(),
            self.gated_operations.iter().copied(),
        )
    }
}

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub documents: DocumentSettings,
    pub registry: RegistrySettings,
    pub access: AccessSettings,
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{}, is not a supported environment; use either local or production",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Error determining configuration directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");
    // Detect the running environment, default to local if not specified
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());
    config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // E.g `APP_ACCESS__SHARED_SECRET=...` sets `Settings.access.shared_secret`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<Settings>()
}
