//! Error handling for the migration core
//!
//! This module defines the error types used throughout the migration core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// EIP-1193 error code returned when the wallet does not know the requested chain
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// EIP-1193 error code returned when the user rejects a request
pub const USER_REJECTED_CODE: i64 = 4001;

/// Migration error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Indexer error: {0}")]
    Indexer(String),

    #[error("Provider error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("Role conflict: {0}")]
    RoleConflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MigrationError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an indexer error
    pub fn indexer(message: impl Into<String>) -> Self {
        Self::Indexer(message.into())
    }

    /// Create a role conflict error
    pub fn role_conflict(message: impl Into<String>) -> Self {
        Self::RoleConflict(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Short human-readable text for the UI element that triggered the operation
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider { message, .. } => message.clone(),
            Self::Config(m)
            | Self::Validation(m)
            | Self::Network(m)
            | Self::Indexer(m)
            | Self::RoleConflict(m)
            | Self::Internal(m) => m.clone(),
        }
    }
}

/// Error reported by an EIP-1193 provider
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_CODE, "User rejected the request.")
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == UNRECOGNIZED_CHAIN_CODE
    }

    /// First line of the provider message, or `None` when the wallet sent nothing useful
    pub fn short_message(&self) -> Option<&str> {
        self.message
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
    }
}

impl From<ProviderError> for MigrationError {
    fn from(err: ProviderError) -> Self {
        Self::Provider {
            code: err.code,
            message: err.message,
        }
    }
}

impl From<std::io::Error> for MigrationError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(format!("IO error: {}", err))
    }
}

impl From<hex::FromHexError> for MigrationError {
    fn from(err: hex::FromHexError) -> Self {
        Self::validation(format!("Hex decoding error: {}", err))
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for MigrationError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(format!("HTTP error: {}", err))
    }
}

impl From<::config::ConfigError> for MigrationError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MigrationError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

pub type MigrationResult<T> = Result<T, MigrationError>;
