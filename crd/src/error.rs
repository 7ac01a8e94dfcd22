//! Error types for CRD assembly and registration.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! serialization, configuration validation, and schema synthesis.

use composite_schema_core::BuildError;
use thiserror::Error;

/// Errors that can occur while generating or registering CRD documents.
#[derive(Debug, Error)]
pub enum CrdError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration validation failure (e.g., empty group).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Schema synthesis failed for the custom fields.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Convenience alias for results with [`CrdError`].
pub type Result<T> = std::result::Result<T, CrdError>;
