//! Configuration types for the sales analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. The defaults give the
//! standard run: 100 orders, seed 42, a 30 day date window anchored at
//! 2026-07-01 and the 3-sigma outlier rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default seed of the fixture generator.
pub const DEFAULT_SEED: u64 = 42;

/// Default number of generated orders (before duplicates are appended).
pub const DEFAULT_ROW_COUNT: usize = 100;

/// Default width of the random purchase-date window, in days.
pub const DEFAULT_DATE_JITTER_DAYS: u32 = 30;

/// Default number of standard deviations above the mean that marks an outlier.
pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;

/// Anchor date of the generated purchase dates.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 1).unwrap_or_default()
}

/// Configuration for the sales analysis pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use sales_analysis::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .seed(7)
///     .row_count(250)
///     .render_charts(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Seed of the pseudo-random fixture generator.
    /// Default: 42
    pub seed: u64,

    /// Number of orders to generate before duplicates are appended.
    /// Default: 100
    pub row_count: usize,

    /// First day of the generated date range.
    /// Default: 2026-07-01
    pub start_date: NaiveDate,

    /// Purchase dates are shifted back by a random offset in `[0, date_jitter_days)`.
    /// Default: 30
    pub date_jitter_days: u32,

    /// Quantities at or above `mean + outlier_sigma * std` are trimmed.
    /// Default: 3.0
    pub outlier_sigma: f64,

    /// Output directory for charts, reports and the cleaned dataset.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// Whether to render SVG charts.
    /// Default: true
    pub render_charts: bool,

    /// Whether to write the JSON report and the cleaned CSV to disk.
    /// Default: false
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            row_count: DEFAULT_ROW_COUNT,
            start_date: default_start_date(),
            date_jitter_days: DEFAULT_DATE_JITTER_DAYS,
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
            output_dir: PathBuf::from("outputs"),
            render_charts: true,
            save_to_disk: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.row_count == 0 {
            return Err(ConfigValidationError::InvalidRowCount(self.row_count));
        }

        if self.date_jitter_days == 0 {
            return Err(ConfigValidationError::InvalidDateJitter(
                self.date_jitter_days,
            ));
        }

        if !self.outlier_sigma.is_finite() || self.outlier_sigma <= 0.0 {
            return Err(ConfigValidationError::InvalidOutlierSigma(
                self.outlier_sigma,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid row count: {0} (must be at least 1)")]
    InvalidRowCount(usize),

    #[error("Invalid date jitter: {0} days (must be at least 1)")]
    InvalidDateJitter(u32),

    #[error("Invalid outlier sigma: {0} (must be a positive, finite number)")]
    InvalidOutlierSigma(f64),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    seed: Option<u64>,
    row_count: Option<usize>,
    start_date: Option<NaiveDate>,
    date_jitter_days: Option<u32>,
    outlier_sigma: Option<f64>,
    output_dir: Option<PathBuf>,
    render_charts: Option<bool>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the seed of the fixture generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of generated orders.
    pub fn row_count(mut self, rows: usize) -> Self {
        self.row_count = Some(rows);
        self
    }

    /// Set the anchor date of the generated purchase dates.
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Set the width of the random purchase-date window.
    pub fn date_jitter_days(mut self, days: u32) -> Self {
        self.date_jitter_days = Some(days);
        self
    }

    /// Set the number of standard deviations used by outlier trimming.
    ///
    /// # Arguments
    /// * `sigma` - Positive multiplier (e.g., 3.0 for the 3-sigma rule)
    pub fn outlier_sigma(mut self, sigma: f64) -> Self {
        self.outlier_sigma = Some(sigma);
        self
    }

    /// Set the output directory for charts and reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Enable or disable writing the report and the cleaned CSV.
    ///
    /// When false, results are kept in memory only.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            row_count: self.row_count.unwrap_or(DEFAULT_ROW_COUNT),
            start_date: self.start_date.unwrap_or_else(default_start_date),
            date_jitter_days: self.date_jitter_days.unwrap_or(DEFAULT_DATE_JITTER_DAYS),
            outlier_sigma: self.outlier_sigma.unwrap_or(DEFAULT_OUTLIER_SIGMA),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("outputs")),
            render_charts: self.render_charts.unwrap_or(true),
            save_to_disk: self.save_to_disk.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.row_count, 100);
        assert_eq!(config.date_jitter_days, 30);
        assert_eq!(config.outlier_sigma, 3.0);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
        assert!(config.render_charts);
        assert!(!config.save_to_disk);
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.row_count, DEFAULT_ROW_COUNT);
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .seed(7)
            .row_count(20)
            .date_jitter_days(5)
            .outlier_sigma(2.5)
            .render_charts(false)
            .save_to_disk(true)
            .build()
            .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.row_count, 20);
        assert_eq!(config.date_jitter_days, 5);
        assert_eq!(config.outlier_sigma, 2.5);
        assert!(!config.render_charts);
        assert!(config.save_to_disk);
    }

    #[test]
    fn test_validation_invalid_row_count() {
        let result = PipelineConfig::builder().row_count(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidRowCount(0)
        ));
    }

    #[test]
    fn test_validation_invalid_jitter() {
        let result = PipelineConfig::builder().date_jitter_days(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidDateJitter(0)
        ));
    }

    #[test]
    fn test_validation_invalid_sigma() {
        assert!(PipelineConfig::builder().outlier_sigma(0.0).build().is_err());
        assert!(PipelineConfig::builder().outlier_sigma(-1.0).build().is_err());
        assert!(
            PipelineConfig::builder()
                .outlier_sigma(f64::NAN)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.seed, deserialized.seed);
        assert_eq!(config.start_date, deserialized.start_date);
        assert_eq!(config.outlier_sigma, deserialized.outlier_sigma);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "seed": 1,
            "row_count": 50,
            "start_date": "2025-01-15",
            "date_jitter_days": 10,
            "outlier_sigma": 2.0,
            "output_dir": "custom_output",
            "render_charts": false,
            "save_to_disk": true
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).expect("Should deserialize");

        assert_eq!(config.seed, 1);
        assert_eq!(config.row_count, 50);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(config.output_dir.to_str().unwrap(), "custom_output");
        assert!(!config.render_charts);
        assert!(config.save_to_disk);
    }
}
