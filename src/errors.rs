use thiserror::Error;

/// Failures raised by a storage backend while persisting the collection.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unknown storage format `{0}` (expected `json` or `csv`)")]
    UnknownFormat(String),
    #[error("Rating `{0}` is not a finite number")]
    NonFiniteRating(f64),
    #[error("Missing column `{0}` in CSV header")]
    MissingColumn(String),
    #[error("Invalid {field} `{value}` in CSV row {row}")]
    InvalidCell {
        field: &'static str,
        value: String,
        row: u64,
    },
}

/// Error type surfaced by the catalog service to its callers.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Movie \"{0}\" already exists")]
    DuplicateTitle(String),
    #[error("Movie \"{title}\" does not exist")]
    NotFound {
        title: String,
        suggestion: Option<String>,
    },
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Failures while loading or saving the persisted [`crate::config::CatalogConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}
