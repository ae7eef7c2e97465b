//! Custom error types for ledger-import
//!
//! This module defines the error hierarchy for the import workflow using
//! thiserror for ergonomic error definitions.

use thiserror::Error;

/// The main error type for import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Field-level validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A wizard transition or action whose preconditions are not met
    #[error("Cannot continue: {0}")]
    Step(String),

    /// A request of the same kind is already running
    #[error("{0} is already in progress")]
    InFlight(&'static str),

    /// The backend answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl ImportError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for preview rows
    pub fn row_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Row",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for uploaded files
    pub fn file_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "File",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from the backend or the network
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Network(_))
    }

    /// Check if this is a step guard error
    pub fn is_step(&self) -> bool {
        matches!(self, Self::Step(_))
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => Self::Json(err.to_string()),
            None => Self::Network(err.to_string()),
        }
    }
}

/// Result type alias for import operations
pub type ImportResult<T> = Result<T, ImportError>;
