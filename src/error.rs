//! Error types for citation processing.
//!
//! This module provides the [`CiteError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! A record without an identifier is not an error: it is routed to the
//! faulty partition by the dedup engine. Errors here are the conditions that
//! abort a run.

use thiserror::Error;

/// Error type for all citation processing operations.
#[derive(Error, Debug)]
pub enum CiteError {
    /// Error indicating a record could not be written.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Error indicating an input file pattern could not be compiled or expanded.
    #[error("Invalid input pattern: {0}")]
    InvalidPattern(String),

    /// Error loading or parsing a configuration file.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error encoding a report.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`CiteError`].
pub type Result<T> = std::result::Result<T, CiteError>;
