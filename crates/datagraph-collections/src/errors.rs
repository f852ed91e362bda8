//! Error types for the collection client and list controller

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Communication error: {0}")]
    Communication(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Backend error {code}: {message}")]
    Api { code: u16, message: String },
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Invalid request: {0}")]
    Validation(String),
}

pub type CollectionResult<T> = Result<T, CollectionError>;
