//! Custom error types for the sales analysis pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Stage modules
//! work with `anyhow::Result` internally; the [`Pipeline`](crate::Pipeline)
//! maps their failures into the variant matching the stage that failed.
//!
//! Errors are serializable so a report consumer can receive a stable
//! `code` alongside the human-readable message.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the sales analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Fixture generation failed.
    #[error("Failed to generate fixture: {0}")]
    GenerationFailed(String),

    /// Dataset inspection failed.
    #[error("Failed to inspect dataset: {0}")]
    InspectionFailed(String),

    /// Data cleaning failed.
    #[error("Failed to clean data: {0}")]
    CleaningFailed(String),

    /// Aggregation failed.
    #[error("Failed to aggregate sales: {0}")]
    AggregationFailed(String),

    /// Chart rendering failed.
    #[error("Failed to render chart: {0}")]
    RenderFailed(String),

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::GenerationFailed(_) => "GENERATION_FAILED",
            Self::InspectionFailed(_) => "INSPECTION_FAILED",
            Self::CleaningFailed(_) => "CLEANING_FAILED",
            Self::AggregationFailed(_) => "AGGREGATION_FAILED",
            Self::RenderFailed(_) => "RENDER_FAILED",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            AnalysisError::CleaningFailed("quantity".to_string()).error_code(),
            "CLEANING_FAILED"
        );
        assert_eq!(
            AnalysisError::RenderFailed("backend".to_string()).error_code(),
            "RENDER_FAILED"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = AnalysisError::AggregationFailed("missing unit_price".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("AGGREGATION_FAILED"));
        assert!(json.contains("unit_price"));
    }

    #[test]
    fn test_with_context() {
        let error = AnalysisError::RenderFailed("backend".to_string())
            .with_context("Rendering charts");
        assert!(error.to_string().contains("Rendering charts"));
        assert_eq!(error.error_code(), "RENDER_FAILED"); // Preserves original code
    }

    #[test]
    fn test_result_ext_on_polars_error() {
        let result: std::result::Result<(), polars::error::PolarsError> = Err(
            polars::error::PolarsError::ColumnNotFound("quantity".into()),
        );
        let err = result.context("Reading quantity").unwrap_err();
        assert_eq!(err.error_code(), "POLARS_ERROR");
        assert!(err.to_string().starts_with("Reading quantity"));
    }
}
