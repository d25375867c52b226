use crate::types::{CleaningReport, PipelineRun, Profile, RunSummary};
use anyhow::Result;
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Unified run report for CLI and library output.
///
/// Merges the shape accounting, the cleaning report, and the statistical
/// profile into one serializable structure. Use this for both JSON output
/// (`--json`) and file writing (`--report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Timestamp when the report was generated.
    pub generated_at: String,
    /// Path to the input file.
    pub input_file: String,
    /// Path to the cleaned CSV, when one was written.
    pub output_file: Option<String>,
    /// Shape and missing-cell accounting for the run.
    pub summary: RunSummary,
    /// What the cleaning stages did.
    pub cleaning: CleaningReport,
    /// Statistical profile of the cleaned table.
    pub profile: Profile,
}

pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: Option<String>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
            output_name: None,
        }
    }
}

impl ReportGenerator {
    /// Create a ReportGenerator with custom output settings.
    pub fn new(output_dir: PathBuf, output_name: Option<String>) -> Self {
        Self {
            output_dir,
            output_name,
        }
    }

    /// Build the unified report for a pipeline run.
    pub fn build_report(
        input_file: &str,
        output_file: Option<&str>,
        run: &PipelineRun,
    ) -> RunReport {
        RunReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.map(String::from),
            summary: run.summary.clone(),
            cleaning: run.report.clone(),
            profile: run.profile.clone(),
        }
    }

    /// Write a run report to a JSON file.
    ///
    /// The report lands in the output directory as
    /// `{base_name}_report.json`; a configured output name overrides the
    /// base name.
    pub fn write_report_to_file(&self, report: &RunReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let base = self.output_name.as_deref().unwrap_or(base_name);
        let report_path = self.output_dir.join(format!("{}_report.json", base));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Write a cleaned table as CSV at an explicit path, creating parent
    /// directories as needed.
    pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(df)?;

        info!("Dataset saved: {}", path.display());
        Ok(())
    }
}
