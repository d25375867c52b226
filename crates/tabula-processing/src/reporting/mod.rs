//! Report generation module.
//!
//! This module turns a pipeline run into its delivery formats: the
//! templated narrative findings inside the profile, the unified
//! [`RunReport`] JSON, and the cleaned CSV file.
//!
//! # Run Reports
//!
//! Use [`RunReport`] for unified output suitable for:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--report` CLI flag)
//! - Programmatic access in library mode
//!
//! # Example
//!
//! ```rust,ignore
//! use tabula_processing::{Pipeline, ReportGenerator};
//! use std::path::PathBuf;
//!
//! let run = Pipeline::with_defaults().process(dataframe)?;
//! let report = ReportGenerator::build_report("data.csv", None, &run);
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to file
//! let generator = ReportGenerator::new(PathBuf::from("outputs"), None);
//! generator.write_report_to_file(&report, "data")?;
//! ```

mod generator;
mod insights;

pub use generator::{ReportGenerator, RunReport};
pub use insights::InsightGenerator;
