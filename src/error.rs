//! Central error types for leakhound.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic
//! `Display` and `From` implementations.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum HoundError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO operation failed with path context for better error messages
    #[error("IO error at {path}: {error}")]
    IoWithPath {
        error: std::io::Error,
        path: PathBuf,
    },

    /// Failed to parse a Go source file
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// Tree-sitter setup or grammar error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// Configuration file error (load or validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis contract violation (a bug in the analyzer, not in the input)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// JSON serialization error (SARIF output)
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience type alias for Results using HoundError.
pub type Result<T> = std::result::Result<T, HoundError>;

impl HoundError {
    /// Create an IO error with path context.
    #[inline]
    pub fn io_with_path(error: std::io::Error, path: impl Into<PathBuf>) -> Self {
        HoundError::IoWithPath {
            error,
            path: path.into(),
        }
    }
}
