//! Error types for the cleaning and profiling pipeline.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Errors that can occur during cleaning or profiling.
#[derive(Debug, Error)]
pub enum CleaningError {
    /// The input table has no rows. Fatal: nothing can be cleaned.
    #[error("The dataset is empty")]
    EmptyTable,

    /// The input table has no columns. Fatal: nothing can be cleaned.
    #[error("No columns found in dataset")]
    NoColumns,

    /// A referenced column does not exist in the table.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A column has no usable values for the requested operation.
    #[error("No valid values in column: {0}")]
    NoValidValues(String),

    /// Coercing a column to its inferred type failed.
    #[error("Type coercion failed for column '{column}' to {target_kind}: {reason}")]
    TypeCoercionFailed {
        column: String,
        target_kind: String,
        reason: String,
    },

    /// Filling missing values in a column failed.
    #[error("Imputation failed for column '{column}': {reason}")]
    ImputationFailed { column: String, reason: String },

    /// An entire cleaning stage failed; the run degrades to basic cleaning.
    #[error("Cleaning stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },

    /// Statistical profiling failed.
    #[error("Profiling failed: {0}")]
    ProfilingFailed(String),

    /// Writing the cleaned table or the analysis report failed.
    #[error("Report generation failed: {0}")]
    ReportGenerationFailed(String),

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error (reading input, writing outputs).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the polars data layer.
    #[error("Data processing error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error wrapped with additional context.
    #[error("{context}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Wrap this error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            CleaningError::EmptyTable => "EMPTY_TABLE",
            CleaningError::NoColumns => "NO_COLUMNS",
            CleaningError::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            CleaningError::InvalidConfig(_) => "INVALID_CONFIG",
            CleaningError::NoValidValues(_) => "NO_VALID_VALUES",
            CleaningError::TypeCoercionFailed { .. } => "TYPE_COERCION_FAILED",
            CleaningError::ImputationFailed { .. } => "IMPUTATION_FAILED",
            CleaningError::StageFailed { .. } => "STAGE_FAILED",
            CleaningError::ProfilingFailed(_) => "PROFILING_FAILED",
            CleaningError::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            CleaningError::Internal(_) => "INTERNAL_ERROR",
            CleaningError::Io(_) => "IO_ERROR",
            CleaningError::Polars(_) => "POLARS_ERROR",
            CleaningError::Json(_) => "JSON_ERROR",
            CleaningError::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True for the fatal input errors that abort a run before any stage.
    pub fn is_input_error(&self) -> bool {
        match self {
            CleaningError::EmptyTable | CleaningError::NoColumns => true,
            CleaningError::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }

    /// Whether the pipeline can continue past this error with a local
    /// fallback (degraded output, skipped column) instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CleaningError::NoValidValues(_)
            | CleaningError::TypeCoercionFailed { .. }
            | CleaningError::ImputationFailed { .. }
            | CleaningError::StageFailed { .. }
            | CleaningError::ProfilingFailed(_) => true,
            CleaningError::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

// Serialized as {code, message} so report consumers can branch on the code
// without parsing the human-readable text.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for attaching context to results.
pub trait ResultExt<T> {
    /// Attach context to the error, preserving the original as the source.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::prelude::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::from(e).with_context(context))
    }
}
