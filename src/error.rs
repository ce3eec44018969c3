//! Error handling for the reference-data resolution engine
//!
//! This module provides idiomatic Rust error types using thiserror for
//! better error messages and proper error chain handling.

use thiserror::Error;

/// Errors surfaced by the remote catalog client.
///
/// The client never retries automatically; `is_retryable` marks the variants
/// for which the caller should offer a retry affordance.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unauthorized: missing or invalid catalog credential")]
    Unauthorized,

    #[error("Forbidden: credential lacks access to {resource}")]
    Forbidden { resource: String },

    #[error("Not found: catalog has no rows for lookup type '{lookup_type}'")]
    NotFound { lookup_type: String },

    #[error("Conflict: an entry named '{name}' already exists for '{lookup_type}'")]
    Conflict { lookup_type: String, name: String },

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("Network unavailable: {message}")]
    NetworkUnavailable { message: String },
}

impl CatalogError {
    /// Whether the caller should surface a retry affordance for this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::Unauthorized | CatalogError::NetworkUnavailable { .. }
        )
    }

    pub(crate) fn invalid_payload(message: impl Into<String>) -> Self {
        CatalogError::InvalidPayload {
            message: message.into(),
        }
    }

    pub(crate) fn network(message: impl Into<String>) -> Self {
        CatalogError::NetworkUnavailable {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(error: reqwest::Error) -> Self {
        CatalogError::NetworkUnavailable {
            message: error.to_string(),
        }
    }
}

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Raised synchronously, before any I/O, when a resolution operation is
    /// attempted on an item whose dependency has not been resolved yet.
    #[error("Dependency not satisfied: '{field}' requires '{blocked_on}' to be resolved first")]
    DependencyNotSatisfied { field: String, blocked_on: String },

    #[error("Unknown resolution field '{field}'")]
    UnknownField { field: String },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type aliases for convenience
pub type CatalogResult<T> = Result<T, CatalogError>;
pub type ResolutionResult<T> = Result<T, ResolutionError>;
