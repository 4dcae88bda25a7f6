//! Unified error type for the data layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error (status={status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record for {ticker}: {message}")]
    InvalidRecord { ticker: String, message: String },
}

pub type Result<T> = std::result::Result<T, DataError>;
