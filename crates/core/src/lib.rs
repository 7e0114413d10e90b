//! Shared primitives for all Rust crates in mgmtctl.

#![forbid(unsafe_code)]

/// Caller context passed explicitly to every management operation.
pub mod context;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use context::ManagementContext;

/// Result type used across mgmtctl crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Creates a validated non-empty string, naming the offending field on failure.
    pub fn for_field(field: &str, value: impl Into<String>) -> AppResult<Self> {
        Self::new(value)
            .map_err(|_| AppError::Validation(format!("{field} must not be empty")))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or contradictory caller input, detected before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Connection, DNS, timeout or body decoding failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Remote endpoint answered with a failure status.
    #[error("service error (status {status}): {message}")]
    Service {
        /// HTTP status code returned by the remote endpoint.
        status: u16,
        /// Remote-supplied diagnostic message.
        message: String,
    },

    /// Resource coordinates do not resolve to an existing entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller interrupted the invocation.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns a stable name for the error category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transport(_) => "transport",
            Self::Service { .. } => "service",
            Self::NotFound(_) => "not_found",
            Self::Cancelled(_) => "cancelled",
            Self::Internal(_) => "internal",
        }
    }
}
