//! Core data model for the cleaning and profiling pipeline.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic kind assigned to a column by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point measurements.
    Numeric,
    /// Enumerable values (strings, codes, flags).
    Categorical,
    /// Dates and timestamps.
    Datetime,
}

impl ColumnKind {
    /// Human-readable label used in logs and previews.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Datetime => "datetime",
        }
    }
}

/// The classifier's output: three disjoint column-name lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnTypes {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub datetime: Vec<String>,
}

impl ColumnTypes {
    /// Look up the kind of a column by name.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        if self.numeric.iter().any(|c| c == name) {
            Some(ColumnKind::Numeric)
        } else if self.categorical.iter().any(|c| c == name) {
            Some(ColumnKind::Categorical)
        } else if self.datetime.iter().any(|c| c == name) {
            Some(ColumnKind::Datetime)
        } else {
            None
        }
    }

    /// Total number of classified columns.
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len() + self.datetime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-column summary produced by the classifier and consumed downstream.
///
/// Must be recomputed whenever a stage changes column types or values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    pub unique_count: usize,
}

/// What the cleaning stages did to the table.
///
/// Built incrementally as stages run; immutable once returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Columns that were z-score standardized.
    pub numeric_scaled: Vec<String>,
    /// Originally-categorical columns that were encoded (not the expanded
    /// one-hot names).
    pub categorical_encoded: Vec<String>,
    /// True iff at least one column had a value clipped.
    pub outliers_handled: bool,
    /// Columns classified as datetime.
    pub datetime_columns: Vec<String>,
    /// (rows, columns) of the input table.
    pub original_shape: (usize, usize),
    /// (rows, columns) of the cleaned table.
    pub final_shape: (usize, usize),
    /// Set when intermediate cleaning degraded to basic cleaning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CleaningReport {
    /// Create an empty report for a table of the given shape.
    pub fn new(original_shape: (usize, usize)) -> Self {
        Self {
            numeric_scaled: Vec::new(),
            categorical_encoded: Vec::new(),
            outliers_handled: false,
            datetime_columns: Vec::new(),
            original_shape,
            final_shape: original_shape,
            error: None,
        }
    }
}

/// Result of a cleaning run: full success or degraded output.
///
/// A degraded outcome carries the basic-cleaned table and the stage error
/// in `report.error`, so callers can distinguish the two without losing
/// the data.
#[derive(Debug, Clone)]
pub enum CleaningOutcome {
    /// Intermediate cleaning completed.
    Cleaned {
        table: DataFrame,
        report: CleaningReport,
    },
    /// A cleaning stage failed; the table is the basic-cleaned fallback.
    Degraded {
        table: DataFrame,
        report: CleaningReport,
    },
}

impl CleaningOutcome {
    /// The cleaned (or fallback) table, whichever outcome this is.
    pub fn table(&self) -> &DataFrame {
        match self {
            CleaningOutcome::Cleaned { table, .. } => table,
            CleaningOutcome::Degraded { table, .. } => table,
        }
    }

    /// The cleaning report, whichever outcome this is.
    pub fn report(&self) -> &CleaningReport {
        match self {
            CleaningOutcome::Cleaned { report, .. } => report,
            CleaningOutcome::Degraded { report, .. } => report,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, CleaningOutcome::Degraded { .. })
    }

    /// Consume the outcome, yielding the table and report.
    pub fn into_parts(self) -> (DataFrame, CleaningReport) {
        match self {
            CleaningOutcome::Cleaned { table, report } => (table, report),
            CleaningOutcome::Degraded { table, report } => (table, report),
        }
    }
}

/// Descriptive statistics for a numeric column.
///
/// Every float is `Option<f64>`: `None` marks an undefined statistic
/// (empty column, near-zero variance). NaN and infinity never appear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumericSummary {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub variance: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub p10: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
    pub iqr: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    /// Every value attaining the maximum frequency, ascending.
    pub modes: Vec<f64>,
}

/// A (value, count) pair in a categorical frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Statistics record for one column, keyed by name inside the Profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    /// Non-missing cell count.
    pub count: usize,
    pub missing_count: usize,
    /// Distinct non-missing value count.
    pub unique_count: usize,
    /// Present for numeric columns only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    /// Top 10 most frequent values; categorical and datetime columns only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_values: Option<Vec<ValueCount>>,
}

/// Severity of a column alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Info,
}

/// A deterministic per-column data quality alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnAlert {
    pub column: String,
    pub severity: AlertSeverity,
    pub message: String,
}

/// A templated narrative finding derived from the Profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub content: String,
}

/// Full statistical profile for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// (rows, columns) of the profiled table.
    pub shape: (usize, usize),
    /// Composite Data Quality Score, 0-100.
    pub quality_score: f64,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
    pub columns: Vec<ColumnProfile>,
    /// Pearson correlations over numeric columns, rounded to 2 decimals.
    pub correlation: BTreeMap<String, BTreeMap<String, f64>>,
    pub column_alerts: Vec<ColumnAlert>,
    pub smart_insights: Vec<Insight>,
}

// Profiles travel with their run across threads.
static_assertions::assert_impl_all!(Profile: Send, Sync);

/// Shape accounting for one full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub original_shape: (usize, usize),
    /// Shape after basic cleaning (dedupe, drop-empty, rename, classify).
    pub basic_shape: (usize, usize),
    /// Shape after intermediate cleaning.
    pub final_shape: (usize, usize),
    pub duplicates_removed: usize,
    pub missing_before: usize,
    pub missing_after: usize,
}

/// Everything one pipeline run produces: the cleaned table, what the
/// cleaner did, the statistical profile, and the shape accounting.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub table: DataFrame,
    pub report: CleaningReport,
    pub profile: Profile,
    pub summary: RunSummary,
}

impl PipelineRun {
    /// True when intermediate cleaning fell back to the basic-cleaned table.
    pub fn is_degraded(&self) -> bool {
        self.report.error.is_some()
    }
}
