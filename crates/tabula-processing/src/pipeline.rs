//! Pipeline orchestration: cleaning stages plus profiling in one run.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabula_processing::{CleaningConfig, Pipeline};
//!
//! let pipeline = Pipeline::new(CleaningConfig::default())?;
//! let run = pipeline.process(dataframe)?;
//!
//! println!("quality score: {}", run.profile.quality_score);
//! println!("{:?} -> {:?}", run.summary.original_shape, run.summary.final_shape);
//! ```

use crate::cleaner::DataCleaner;
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::profiler::DataProfiler;
use crate::types::{CleaningReport, PipelineRun, RunSummary};
use polars::prelude::*;
use tracing::{info, warn};

/// Deterministic cleaning and profiling pipeline.
///
/// Owns a validated configuration; each [`Pipeline::process`] call owns its
/// table and produces fresh outputs, so one pipeline can serve many runs.
#[derive(Debug)]
pub struct Pipeline {
    config: CleaningConfig,
}

// Runs are handed to worker threads by embedding services.
static_assertions::assert_impl_all!(Pipeline: Send);
static_assertions::assert_impl_all!(PipelineRun: Send);

impl Pipeline {
    /// Create a pipeline with a validated configuration.
    pub fn new(config: CleaningConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;
        Ok(Self { config })
    }

    /// Create a pipeline with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: CleaningConfig::default(),
        }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run the full chain: basic cleaning, intermediate cleaning, profiling.
    ///
    /// A stage failure degrades the run instead of failing it; the returned
    /// report carries the error string and the table is the basic-cleaned
    /// one. Only input errors (empty table, no columns) return `Err`.
    pub fn process(&self, df: DataFrame) -> Result<PipelineRun> {
        let original_shape = df.shape();
        let missing_before = count_missing(&df);
        info!("Pipeline started: {:?}", original_shape);

        let (basic, types) = DataCleaner::basic_clean(df, &self.config)?;
        let basic_shape = basic.shape();

        let outcome = DataCleaner::intermediate_clean(basic, &types, &self.config)?;
        if outcome.is_degraded() {
            warn!("Run degraded to the basic-cleaned table");
        }
        let (table, report) = outcome.into_parts();

        let profile = DataProfiler::profile(&table, &self.config)
            .map_err(|e| CleaningError::ProfilingFailed(e.to_string()))?;

        let summary = RunSummary {
            original_shape,
            basic_shape,
            final_shape: table.shape(),
            duplicates_removed: original_shape.0.saturating_sub(basic_shape.0),
            missing_before,
            missing_after: count_missing(&table),
        };
        info!(
            "Pipeline finished: {:?} -> {:?}, quality score {}",
            original_shape, summary.final_shape, profile.quality_score
        );

        Ok(PipelineRun {
            table,
            report,
            profile,
            summary,
        })
    }

    /// Run basic cleaning only, then profile the result.
    ///
    /// No imputation, outlier capping, encoding, or scaling happens; the
    /// report's stage records stay empty.
    pub fn process_basic(&self, df: DataFrame) -> Result<PipelineRun> {
        let original_shape = df.shape();
        let missing_before = count_missing(&df);
        info!("Pipeline started (basic only): {:?}", original_shape);

        let (table, types) = DataCleaner::basic_clean(df, &self.config)?;
        let mut report = CleaningReport::new(original_shape);
        report.datetime_columns = types.datetime.clone();
        report.final_shape = table.shape();

        let profile = DataProfiler::profile(&table, &self.config)
            .map_err(|e| CleaningError::ProfilingFailed(e.to_string()))?;

        let summary = RunSummary {
            original_shape,
            basic_shape: table.shape(),
            final_shape: table.shape(),
            duplicates_removed: original_shape.0.saturating_sub(table.height()),
            missing_before,
            missing_after: count_missing(&table),
        };

        Ok(PipelineRun {
            table,
            report,
            profile,
            summary,
        })
    }
}

fn count_missing(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|c| c.null_count()).sum()
}
