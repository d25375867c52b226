//! Imputation of missing values.
//!
//! One fixed, type-dependent rule per column kind: median for numeric,
//! mode for categorical, nothing for datetime.

mod statistical;

pub use statistical::StatisticalImputer;
