//! Error types for the locmap-eval library.

use thiserror::Error;

/// Result type for locmap-eval operations.
pub type Result<T> = std::result::Result<T, LocEvalError>;

/// Error types that can occur during localization evaluation.
#[derive(Error, Debug)]
pub enum LocEvalError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A raw row does not have the expected number of columns.
    #[error("Invalid shape: expected {expected} columns, found {found}")]
    InvalidShape { expected: usize, found: usize },

    /// A raw row carries a value that cannot be decoded.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Invalid distance threshold or threshold list.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Invalid evaluation parameters.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Worker pools need at least one thread.
    #[error("Invalid worker count: {0}")]
    InvalidWorkerCount(usize),

    /// Requested threshold is not a key of the result mapping.
    #[error("Threshold {0} was not evaluated")]
    MissingThreshold(f64),

    /// Range-average query over no thresholds.
    #[error("Empty threshold query")]
    EmptyQuery,

    /// A worker failed while scoring a threshold.
    #[error("Worker failed at threshold {threshold}: {reason}")]
    WorkerFailed { threshold: f64, reason: String },

    /// The join barrier completed without every threshold being scored.
    #[error("Incomplete results: {completed} of {expected} thresholds completed")]
    IncompleteResults { expected: usize, completed: usize },

    /// The worker pool could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
