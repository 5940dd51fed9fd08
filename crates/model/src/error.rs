//! Error types for the model engine
//!
//! Provides error handling for commit orchestration, schema configuration,
//! and record serialization.

use std::fmt;

use crate::callback_error::CallbackError;
use crate::store::StoreError;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for model-engine operations
#[derive(Debug, Clone)]
pub enum ModelError {
    /// Database or backing-store error
    Database(String),
    /// Record not found in the backing store
    NotFound(String),
    /// Primary key is missing or invalid
    MissingPrimaryKey,
    /// Serialization/deserialization error
    Serialization(String),
    /// Schema configuration error
    Schema(String),
    /// Configuration error
    Configuration(String),
    /// Lifecycle callback error
    Callback(CallbackError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Database(msg) => write!(f, "Database error: {}", msg),
            ModelError::NotFound(table) => write!(f, "Record not found in table '{}'", table),
            ModelError::MissingPrimaryKey => write!(f, "Primary key is missing or invalid"),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Schema(msg) => write!(f, "Schema error: {}", msg),
            ModelError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::Callback(err) => write!(f, "Callback error: {}", err),
        }
    }
}

impl std::error::Error for ModelError {}

// Convert from sqlx errors
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

// Convert from anyhow errors
impl From<anyhow::Error> for ModelError {
    fn from(err: anyhow::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

impl From<StoreError> for ModelError {
    fn from(err: StoreError) -> Self {
        ModelError::Database(err.to_string())
    }
}

impl From<CallbackError> for ModelError {
    fn from(err: CallbackError) -> Self {
        ModelError::Callback(err)
    }
}
