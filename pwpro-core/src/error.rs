use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PwProError {
    #[error("{collection} record '{id}' not found")]
    EntityNotFound { collection: &'static str, id: Uuid },

    #[error("{collection} record '{id}' already exists")]
    DuplicateEntity { collection: &'static str, id: Uuid },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse YAML from '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),

    #[error("Geocoding failed for '{address}': {reason}")]
    Geocoding { address: String, reason: String },
}
