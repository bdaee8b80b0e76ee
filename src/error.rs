//! Error types for line-format MARC operations.
//!
//! This module provides the [`MarcError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! Malformed catalog data is generally *not* an error here: structural
//! problems inside a record are reported as
//! [`ValidationError`](crate::validation::ValidationError) findings. Only
//! unclassifiable lines, bad configuration and I/O faults surface as
//! [`MarcError`].

use thiserror::Error;

/// Error type for all library operations.
#[derive(Error, Debug)]
pub enum MarcError {
    /// A raw input line could not be classified into a fragment.
    #[error("Invalid line format at line {line_number}: {line:?}")]
    InvalidLineFormat {
        /// 1-based line number in the source
        line_number: usize,
        /// The raw line text
        line: String,
    },

    /// A schema definition is inconsistent or incomplete.
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// A line format configuration is inconsistent.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error parsing a value such as a schema version.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// IO error from the underlying source.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error decoding JSON registry or configuration data.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
