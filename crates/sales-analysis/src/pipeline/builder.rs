//! Main analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating one run: generate, inspect, clean, aggregate, render
//! and report.

use crate::aggregation::SalesAggregator;
use crate::charts::ChartRenderer;
use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::{AnalysisError, Result, ResultExt};
use crate::fixture::{FixtureConfig, FixtureGenerator};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataInspector;
use crate::reporting::ReportGenerator;
use crate::types::{CleaningSummary, PipelineResult, columns};
use crate::utils::numeric_values;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The sales analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use sales_analysis::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().seed(7).render_charts(false).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
///
/// println!("revenue: {:.2}", result.sales.total_revenue);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    renderer: ChartRenderer,
    reporter: ReportGenerator,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline once.
    ///
    /// Reports [`PipelineStage::Complete`] or [`PipelineStage::Failed`]
    /// to the progress reporter before returning.
    pub fn run(&self) -> Result<PipelineResult> {
        match self.run_internal() {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn start_stage(&self, stage: PipelineStage, message: &str) {
        info!("{}", message);
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn run_internal(&self) -> Result<PipelineResult> {
        let start_time = Instant::now();
        info!("Starting sales analysis pipeline...");

        // 1. Fixture
        self.start_stage(PipelineStage::Generating, "Generating synthetic sales table...");
        let (raw_data, defects) = FixtureGenerator::new(FixtureConfig::from(&self.config))
            .generate()
            .map_err(|e| AnalysisError::GenerationFailed(e.to_string()))?;
        info!("Injected {} defects", defects.total());

        // 2. Raw inspection
        self.start_stage(PipelineStage::Inspecting, "Inspecting raw table...");
        let raw_inspection = DataInspector::inspect(&raw_data)
            .map_err(|e| AnalysisError::InspectionFailed(e.to_string()))?;

        // 3. Cleaning, stage by stage
        let mut df = raw_data.clone();
        let mut cleaning = CleaningSummary::new();
        cleaning.rows_before = df.height();
        let cleaning_failed = |e: anyhow::Error| AnalysisError::CleaningFailed(e.to_string());

        self.start_stage(PipelineStage::TypeCoercion, "Coercing unit price and customer id...");
        self.cleaner
            .coerce_types(&mut df, &mut cleaning)
            .map_err(cleaning_failed)?;

        self.start_stage(PipelineStage::Imputation, "Imputing quantity and delivery status...");
        self.cleaner
            .impute_missing(&mut df, &mut cleaning)
            .map_err(cleaning_failed)?;

        self.start_stage(PipelineStage::RowRemoval, "Removing unrecoverable rows...");
        self.cleaner
            .drop_unrecoverable(&mut df, &mut cleaning)
            .map_err(cleaning_failed)?;

        self.start_stage(PipelineStage::Deduplication, "Removing duplicate rows...");
        self.cleaner
            .remove_duplicates(&mut df, &mut cleaning)
            .map_err(cleaning_failed)?;

        self.start_stage(PipelineStage::OutlierTrimming, "Trimming quantity outliers...");
        let quantities_before = quantity_values(&df)?;
        self.cleaner
            .trim_outliers(&mut df, &mut cleaning)
            .map_err(cleaning_failed)?;
        let quantities_after = quantity_values(&df)?;
        cleaning.rows_after = df.height();
        info!(
            "Cleaning finished: {} -> {} rows",
            cleaning.rows_before, cleaning.rows_after
        );

        // 4. Aggregation
        self.start_stage(PipelineStage::Aggregation, "Aggregating sales...");
        let cleaned_data = SalesAggregator::add_total_sale(&df)
            .map_err(|e| AnalysisError::AggregationFailed(e.to_string()))?;
        let sales = SalesAggregator::summarize(&cleaned_data)
            .map_err(|e| AnalysisError::AggregationFailed(e.to_string()))?;
        let cleaned_inspection = DataInspector::inspect(&cleaned_data)
            .map_err(|e| AnalysisError::InspectionFailed(e.to_string()))?;

        // 5. Charts
        let charts = if self.config.render_charts {
            self.start_stage(PipelineStage::Rendering, "Rendering charts...");
            self.renderer
                .render_all(&sales, &quantities_before, &quantities_after)
                .map_err(|e| AnalysisError::RenderFailed(e.to_string()))?
        } else {
            Vec::new()
        };

        let mut result = PipelineResult {
            raw_data,
            defects,
            cleaned_data,
            raw_inspection,
            cleaned_inspection,
            cleaning,
            sales,
            charts,
            written_files: Vec::new(),
            duration_ms: 0,
        };

        // 6. Report and cleaned CSV
        if self.config.save_to_disk {
            self.start_stage(PipelineStage::ReportGeneration, "Writing report and cleaned table...");
            result.duration_ms = start_time.elapsed().as_millis() as u64;
            let report = ReportGenerator::build_report(&result, &self.config);
            let report_failed = |e: anyhow::Error| AnalysisError::ReportGenerationFailed(e.to_string());
            let report_path = self
                .reporter
                .write_report_to_file(&report)
                .map_err(report_failed)?;
            let csv_path = self
                .reporter
                .write_cleaned_csv(&result.cleaned_data)
                .map_err(report_failed)?;
            result.written_files = vec![report_path, csv_path];
        }

        result.duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Pipeline finished in {} ms", result.duration_ms);
        Ok(result)
    }
}

fn quantity_values(df: &polars::prelude::DataFrame) -> Result<Vec<f64>> {
    let series = df
        .column(columns::QUANTITY)
        .context("Reading quantities for the boxplots")?
        .as_materialized_series();
    numeric_values(series).context("Reading quantities for the boxplots")
}

/// Builder for creating a [`Pipeline`].
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during the run.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use sales_analysis::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            cleaner: DataCleaner::new(config.outlier_sigma),
            renderer: ChartRenderer::new(config.output_dir.clone()),
            reporter: ReportGenerator::new(config.output_dir.clone()),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn in_memory() -> PipelineConfig {
        PipelineConfig::builder().render_charts(false).build().unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert!(pipeline.progress_reporter.is_none());
        assert_eq!(pipeline.config().seed, 42);
        assert!(pipeline.config().render_charts);
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = PipelineConfig {
            outlier_sigma: -1.0,
            ..Default::default()
        };
        let result = Pipeline::builder().config(config).build();
        assert!(matches!(
            result.err(),
            Some(ConfigValidationError::InvalidOutlierSigma(_))
        ));
    }

    #[test]
    fn test_pipeline_builder_with_progress_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.report_progress(ProgressUpdate::new(PipelineStage::Aggregation, 0.5, "Test"));

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_reports_stages_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();

        Pipeline::builder()
            .config(in_memory())
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                PipelineStage::Generating,
                PipelineStage::Inspecting,
                PipelineStage::TypeCoercion,
                PipelineStage::Imputation,
                PipelineStage::RowRemoval,
                PipelineStage::Deduplication,
                PipelineStage::OutlierTrimming,
                PipelineStage::Aggregation,
                PipelineStage::Complete,
            ]
        );
    }

    #[test]
    fn test_run_without_outputs_writes_nothing() {
        let result = Pipeline::builder().config(in_memory()).build().unwrap().run().unwrap();

        assert!(result.charts.is_empty());
        assert!(result.written_files.is_empty());
        assert_eq!(result.raw_data.height(), 103);
        assert_eq!(result.cleaning.rows_before, 103);
        assert_eq!(result.cleaning.rows_after, result.cleaned_data.height());
        assert!(result.cleaned_data.column(columns::TOTAL_SALE).is_ok());
    }

    #[test]
    fn test_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::builder()
            .output_dir(dir.path())
            .save_to_disk(true)
            .build()
            .unwrap();

        let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();

        assert_eq!(result.charts.len(), 6);
        assert_eq!(result.written_files.len(), 2);
        assert!(dir.path().join("sales_report.json").exists());
        assert!(dir.path().join("cleaned_sales.csv").exists());
    }
}
