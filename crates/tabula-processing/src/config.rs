//! Configuration for the cleaning pipeline.
//!
//! Options are threaded explicitly through every stage call; there are no
//! module-level threshold constants.

use serde::{Deserialize, Serialize};

/// Configuration for a cleaning run.
///
/// Use [`CleaningConfig::builder()`] for fluent setup.
///
/// # Example
///
/// ```rust,ignore
/// use tabula_processing::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .handle_outliers(false)
///     .cat_threshold(20)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Whether to z-score standardize numeric columns.
    /// Default: true
    pub scale_numeric: bool,

    /// Whether to encode categorical columns.
    /// Default: true
    pub encode_categorical: bool,

    /// Whether to winsorize numeric outliers at IQR bounds.
    /// Default: true
    pub handle_outliers: bool,

    /// Distinct-value count below which categorical columns are one-hot
    /// encoded; at or above, label encoding applies.
    /// Default: 50
    pub cat_threshold: usize,

    /// Distinct-value count at or above which categorical columns are
    /// frequency encoded instead of label encoded.
    /// Default: 1000
    pub high_card_threshold: usize,

    /// Minimum fraction of values that must parse as dates for a column to
    /// be reclassified as datetime (0.0 - 1.0).
    /// Default: 0.8
    pub datetime_threshold: f64,
}

// Configurations are shared across worker threads unchanged.
static_assertions::assert_impl_all!(CleaningConfig: Send, Sync);

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            scale_numeric: true,
            encode_categorical: true,
            handle_outliers: true,
            cat_threshold: 50,
            high_card_threshold: 1000,
            datetime_threshold: 0.8,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.datetime_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "datetime_threshold".to_string(),
                value: self.datetime_threshold,
            });
        }

        if self.cat_threshold > self.high_card_threshold {
            return Err(ConfigValidationError::ThresholdOrder {
                cat_threshold: self.cat_threshold,
                high_card_threshold: self.high_card_threshold,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error(
        "cat_threshold ({cat_threshold}) must not exceed high_card_threshold ({high_card_threshold})"
    )]
    ThresholdOrder {
        cat_threshold: usize,
        high_card_threshold: usize,
    },
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    scale_numeric: Option<bool>,
    encode_categorical: Option<bool>,
    handle_outliers: Option<bool>,
    cat_threshold: Option<usize>,
    high_card_threshold: Option<usize>,
    datetime_threshold: Option<f64>,
}

impl CleaningConfigBuilder {
    /// Enable or disable numeric standardization.
    pub fn scale_numeric(mut self, scale: bool) -> Self {
        self.scale_numeric = Some(scale);
        self
    }

    /// Enable or disable categorical encoding.
    pub fn encode_categorical(mut self, encode: bool) -> Self {
        self.encode_categorical = Some(encode);
        self
    }

    /// Enable or disable outlier winsorization.
    pub fn handle_outliers(mut self, handle: bool) -> Self {
        self.handle_outliers = Some(handle);
        self
    }

    /// Set the one-hot / label encoding cardinality boundary.
    pub fn cat_threshold(mut self, threshold: usize) -> Self {
        self.cat_threshold = Some(threshold);
        self
    }

    /// Set the label / frequency encoding cardinality boundary.
    pub fn high_card_threshold(mut self, threshold: usize) -> Self {
        self.high_card_threshold = Some(threshold);
        self
    }

    /// Set the datetime reclassification threshold.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.8 = 80%)
    pub fn datetime_threshold(mut self, threshold: f64) -> Self {
        self.datetime_threshold = Some(threshold);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            scale_numeric: self.scale_numeric.unwrap_or(true),
            encode_categorical: self.encode_categorical.unwrap_or(true),
            handle_outliers: self.handle_outliers.unwrap_or(true),
            cat_threshold: self.cat_threshold.unwrap_or(50),
            high_card_threshold: self.high_card_threshold.unwrap_or(1000),
            datetime_threshold: self.datetime_threshold.unwrap_or(0.8),
        };

        config.validate()?;
        Ok(config)
    }
}
