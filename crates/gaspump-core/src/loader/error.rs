use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scraped data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scraped data must be a list of station objects")]
    NotAnArray,

    #[error("Invalid station record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database did not report an id for the new {0} row")]
    MissingInsertId(&'static str),
}
