//! Sales Analysis Library
//!
//! Generates a synthetic retail sales table with known defects, cleans it
//! and reports revenue analytics, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Fixture**: Seeded sale records with planted nulls, duplicates, a bad
//!   price token, text-typed columns and a quantity outlier
//! - **Inspection**: Shape, dtypes, null counts and descriptive statistics
//! - **Cleaning**: Type coercion, median/mode imputation, removal of
//!   unrecoverable rows and duplicates, 3-sigma outlier trimming
//! - **Aggregation**: Revenue by category, units by product, daily revenue,
//!   delivery status distribution
//! - **Charts**: SVG bar, line, pie and box plots
//! - **Reporting**: JSON report and cleaned CSV
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sales_analysis::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .seed(42)
//!     .output_dir("outputs")
//!     .save_to_disk(true)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("Rows: {} -> {}", result.cleaning.rows_before, result.cleaning.rows_after);
//! println!("Revenue: {:.2}", result.sales.total_revenue);
//! ```
//!
//! The stages are also usable on their own:
//!
//! ```rust,ignore
//! use sales_analysis::{DataCleaner, DataInspector, FixtureGenerator, SalesAggregator};
//!
//! let (raw, _defects) = FixtureGenerator::new(Default::default()).generate()?;
//! println!("{} nulls", DataInspector::inspect(&raw)?.total_nulls());
//!
//! let (clean, summary) = DataCleaner::default().clean(raw)?;
//! let clean = SalesAggregator::add_total_sale(&clean)?;
//! let by_category = SalesAggregator::revenue_by_category(&clean)?;
//! ```

pub mod aggregation;
pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod fixture;
pub mod imputers;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregation::{DailyTotal, GroupTotal, SalesAggregator, SalesSummary};
pub use charts::ChartRenderer;
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use fixture::{DefectLog, DefectPlan, FixtureConfig, FixtureGenerator};
pub use imputers::StatisticalImputer;
pub use pipeline::{
    ClosureProgressReporter, OutlierHandler, Pipeline, PipelineBuilder, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::{DataInspector, DatasetInspection};
pub use reporting::{AnalysisReport, ReportGenerator};
pub use types::{
    ActionType, CleaningAction, CleaningSummary, DeliveryStatus, PipelineResult, columns,
};
