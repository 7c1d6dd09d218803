//! Error types shared across the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the subject catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Could not read catalog '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not fetch catalog: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog request failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog has an unexpected shape: {0}")]
    Shape(String),
}

/// Failures of the durable snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Could not prepare storage directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of completion-state mutations.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Unrecognized subject combo '{0}'")]
    InvalidCombo(String),

    #[error("Could not encode progress snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures while composing or sending a plan request.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Name is required")]
    MissingName,

    #[error("Invalid email address '{0}'")]
    InvalidEmail(String),

    #[error("Hours per day must be between 1 and 24, got '{0}'")]
    InvalidHours(String),

    #[error("Exam date must look like YYYY-MM-DD, got '{0}'")]
    InvalidDate(String),

    #[error("Invalid messaging endpoint: {0}")]
    Url(#[from] url::ParseError),

    #[error("Messaging endpoint cannot carry a recipient path: {0}")]
    EndpointBase(String),

    #[error("Could not open messaging link: {0}")]
    Open(#[from] std::io::Error),
}
