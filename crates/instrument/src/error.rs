//! Error types for the instrumentation registry.

use thiserror::Error;

/// Errors that can occur when managing histograms and snapshots.
///
/// The scope protocol itself has no recoverable errors; misuse of scopes
/// is a programmer error checked with debug assertions only.
#[derive(Debug, Error)]
pub enum InstrumentError {
    /// No histogram registered under the given name
    #[error("Unknown histogram: {0}")]
    UnknownHistogram(String),

    /// A histogram with the given name already exists
    #[error("Histogram already registered: {0}")]
    DuplicateHistogram(String),

    /// A second histogram was designated as the execute histogram
    #[error("Execute histogram already designated: {0}")]
    ExecuteAlreadyDesignated(String),

    /// Failed to serialize snapshots
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for instrumentation operations.
pub type InstrumentResult<T> = Result<T, InstrumentError>;
