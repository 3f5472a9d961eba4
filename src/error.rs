//! Error types for rolebit

use thiserror::Error;

/// The main error type for rolebit operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RolebitError {
    /// A role table or configuration source is malformed
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Authorization denial. Never carries the rule that fired.
    #[error("no permission")]
    Forbidden,

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for rolebit operations
pub type Result<T> = std::result::Result<T, RolebitError>;

/// Convert any storage-layer error to RolebitError
pub fn err<E: std::error::Error>(e: E) -> RolebitError {
    RolebitError::Storage(e.to_string())
}

pub(crate) fn invalid(msg: impl Into<String>) -> RolebitError {
    RolebitError::InvalidInput(msg.into())
}

impl From<config::ConfigError> for RolebitError {
    fn from(e: config::ConfigError) -> Self {
        RolebitError::Config(e.to_string())
    }
}
