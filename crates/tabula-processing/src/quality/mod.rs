//! Data quality scoring module.
//!
//! This module computes the composite Data Quality Score and the
//! deterministic per-column alerts that feed the profile.

mod analyzer;

pub use analyzer::DataQualityAnalyzer;
