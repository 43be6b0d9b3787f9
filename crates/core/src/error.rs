//! Error types for Draftsman
//!
//! This module provides unified error handling across the workspace: model
//! introspection failures, relation accessor failures, settings payload
//! validation, parsing of the persisted settings literal and file IO.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Draftsman
#[derive(Debug, Error)]
pub enum DraftsmanError {
    // ========================================================================
    // Model Layer Errors
    // ========================================================================
    /// The model collaborator could not describe a model
    #[error("Failed to describe model '{model}': {message}")]
    Describe { model: String, message: String },

    /// The live relation object could not be obtained from a model
    #[error("Failed to resolve relation '{model}.{relation}': {message}")]
    RelationUnavailable {
        model: String,
        relation: String,
        message: String,
    },

    /// A relation accessor raised while being invoked
    #[error("Accessor '{accessor}' failed on '{model}.{relation}': {message}")]
    Accessor {
        model: String,
        relation: String,
        accessor: String,
        message: String,
    },

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Invalid model manifest
    #[error("Invalid model manifest: {0}")]
    InvalidManifest(String),

    // ========================================================================
    // Settings Errors
    // ========================================================================
    /// The incoming settings payload is not a structured mapping
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The persisted settings literal could not be parsed
    #[error("Settings parse error at line {line}, column {column}: {message}")]
    SettingsParse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl DraftsmanError {
    /// Create a describe error
    pub fn describe(model: impl Into<String>, msg: impl Into<String>) -> Self {
        DraftsmanError::Describe {
            model: model.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid payload error
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        DraftsmanError::InvalidPayload(msg.into())
    }

    /// Create a settings parse error
    pub fn parse(line: usize, column: usize, msg: impl Into<String>) -> Self {
        DraftsmanError::SettingsParse {
            line,
            column,
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DraftsmanError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        DraftsmanError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, DraftsmanError::InvalidPayload(_))
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DraftsmanError::ModelNotFound(_))
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            DraftsmanError::FileRead { .. }
                | DraftsmanError::FileWrite { .. }
                | DraftsmanError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using DraftsmanError
pub type DraftsmanResult<T> = Result<T, DraftsmanError>;

// ============================================================================
// Tests
// ============================================================================
