//! Error types for the survival pipeline.
//!
//! Fit-time errors abort the run. Per-row encoding anomalies at predict time are
//! not errors: they surface as [`EncodingWarning`](crate::preprocessing::EncodingWarning)s.

use crate::schema::Column;

/// Error type for every pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A row failed to parse into the expected record shape.
    #[error("Schema error at line {line}, column {column}: {message}")]
    Schema {
        line: u64,
        column: String,
        message: String,
    },
    /// Degenerate statistics or otherwise unusable input (e.g. an all-missing column).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Trainer contract violation.
    #[error("Training error: {0}")]
    Training(String),
    /// Unseen category with `HandleUnknown::Error`.
    #[error("Unknown category {value:?} in column {column}")]
    UnknownCategory { column: Column, value: String },
    /// Feature vector length differs from what the model was fitted on.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn schema(line: u64, column: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Schema {
            line,
            column: column.into(),
            message: message.into(),
        }
    }
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
