//! Error types for the Consulta service.
//!
//! This module defines a unified error enum covering all error categories in
//! the application: configuration, I/O, gateway (language model), similarity
//! index, ingestion, prompt, and serialization errors.

use thiserror::Error;

/// Unified error type for the Consulta service.
///
/// All fallible functions in the application return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
///
/// Failure policy per pipeline stage: index, detector, and generator errors
/// propagate unmodified to the caller. The translator alone recovers locally
/// and never surfaces an error (see `consulta-pipeline`).
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing keys, unknown providers)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The language-model backend failed or returned an unusable response
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// The similarity index is missing, uninitialized, or failed at the
    /// storage layer; fatal to the request
    #[error("Similarity index unavailable: {0}")]
    IndexUnavailable(String),

    /// Document ingestion errors (unreadable source, embedding failures)
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// Prompt template errors (unknown template, missing variables)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Gateway("connection refused".to_string());
        assert_eq!(err.to_string(), "Gateway error: connection refused");

        let err = AppError::IndexUnavailable("no index file".to_string());
        assert!(err.to_string().contains("index unavailable"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io_err.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
