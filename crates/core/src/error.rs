//! Error types for the krepo query service.
//!
//! Three kinds reach the user directly: a blank question, a configuration
//! problem, and a failure of the external document-search service. The
//! remaining variants cover local infrastructure (files, templates, JSON).

use thiserror::Error;

/// Unified error type for krepo.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// The submitted question was empty or whitespace only
    #[error("Question must not be empty")]
    EmptyQuery,

    /// Missing or invalid credential, knowledge-base mapping, or settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure, non-success response, or timeout of the search service
    #[error("External service error: {0}")]
    ExternalService(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prompt definition and rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::EmptyQuery => "empty_query",
            AppError::Config(_) => "configuration",
            AppError::ExternalService(_) => "external_service",
            AppError::Io(_) => "io",
            AppError::Prompt(_) => "prompt",
            AppError::Serialization(_) => "serialization",
            AppError::Other(_) => "other",
        }
    }
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
