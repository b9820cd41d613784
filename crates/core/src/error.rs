//! Error types for docsqa.
//!
//! A single unified error enum covers all error categories in the
//! application: configuration, I/O, model providers, storage, ingestion
//! and serialization. Insufficient evidence is deliberately part of this
//! enum even though it is not a fault: it is a pipeline outcome that the
//! orchestrator boundary catches and converts into a normal response.

use thiserror::Error;

/// Unified error type for docsqa.
///
/// All fallible functions return `Result<T, AppError>`. Library code never
/// panics; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing credentials, bad YAML, unknown provider)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model provider errors (embedding, reranking, generation, vision)
    #[error("Model error: {0}")]
    Model(String),

    /// Storage engine errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Document ingestion errors
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Not enough high-quality sources to answer. Carries the user-facing
    /// refusal message. Not a system fault.
    #[error("{0}")]
    InsufficientEvidence(String),

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

impl AppError {
    /// Whether this error is the insufficient-evidence outcome rather
    /// than a real failure.
    pub fn is_insufficient_evidence(&self) -> bool {
        matches!(self, AppError::InsufficientEvidence(_))
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_evidence_is_not_a_fault() {
        let err = AppError::InsufficientEvidence("no sources".to_string());
        assert!(err.is_insufficient_evidence());
        assert_eq!(err.to_string(), "no sources");

        let err = AppError::Model("boom".to_string());
        assert!(!err.is_insufficient_evidence());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(err.to_string().contains("missing"));
    }
}
