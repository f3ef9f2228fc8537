//! Progress reporting for the sales pipeline.
//!
//! The pipeline runs synchronously and calls the reporter once per stage.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_analysis::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the sales pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Generating the synthetic table and injecting defects
    Generating,
    /// Inspecting the raw table
    Inspecting,
    /// Coercing text columns to numbers
    TypeCoercion,
    /// Filling missing quantities and statuses
    Imputation,
    /// Dropping rows with unrecoverable nulls
    RowRemoval,
    /// Dropping exact duplicate rows
    Deduplication,
    /// Trimming quantity outliers
    OutlierTrimming,
    /// Computing revenue and quantity totals
    Aggregation,
    /// Rendering SVG charts
    Rendering,
    /// Writing the report and the cleaned CSV
    ReportGeneration,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Generating => "Generating Fixture",
            Self::Inspecting => "Inspecting Dataset",
            Self::TypeCoercion => "Coercing Types",
            Self::Imputation => "Imputing Values",
            Self::RowRemoval => "Removing Incomplete Rows",
            Self::Deduplication => "Removing Duplicates",
            Self::OutlierTrimming => "Trimming Outliers",
            Self::Aggregation => "Aggregating Sales",
            Self::Rendering => "Rendering Charts",
            Self::ReportGeneration => "Generating Reports",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall run (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Generating => 0.10,
            Self::Inspecting => 0.10,
            Self::TypeCoercion => 0.10,
            Self::Imputation => 0.10,
            Self::RowRemoval => 0.05,
            Self::Deduplication => 0.10,
            Self::OutlierTrimming => 0.05,
            Self::Aggregation => 0.10,
            Self::Rendering => 0.20,
            Self::ReportGeneration => 0.10,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Generating => 0.0,
            Self::Inspecting => 0.10,
            Self::TypeCoercion => 0.20,
            Self::Imputation => 0.30,
            Self::RowRemoval => 0.40,
            Self::Deduplication => 0.45,
            Self::OutlierTrimming => 0.55,
            Self::Aggregation => 0.60,
            Self::Rendering => 0.70,
            Self::ReportGeneration => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

/// Trait for receiving progress updates from the pipeline.
pub trait ProgressReporter: Send + Sync {
    /// Called at the start of each stage and once at the end of the run.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}
