use crate::aggregation::SalesSummary;
use crate::config::PipelineConfig;
use crate::fixture::DefectLog;
use crate::profiler::DatasetInspection;
use crate::types::{CleaningSummary, PipelineResult};
use anyhow::Result;
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub const REPORT_FILE: &str = "sales_report.json";
pub const CLEANED_CSV_FILE: &str = "cleaned_sales.csv";

/// JSON report of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub config: PipelineConfig,
    pub defects: DefectLog,
    pub shape: ShapeChange,
    pub raw_inspection: DatasetInspection,
    pub cleaned_inspection: DatasetInspection,
    pub cleaning: CleaningSummary,
    pub sales: SalesSummary,
    /// Chart files written during the run
    pub charts: Vec<String>,
    pub duration_ms: u64,
}

/// Table shape on either side of cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeChange {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
}

/// Writes the report and the cleaned table.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Assemble the report from a finished run.
    pub fn build_report(result: &PipelineResult, config: &PipelineConfig) -> AnalysisReport {
        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            config: config.clone(),
            defects: result.defects.clone(),
            shape: ShapeChange {
                rows_before: result.raw_data.height(),
                rows_after: result.cleaned_data.height(),
                columns_before: result.raw_data.width(),
                columns_after: result.cleaned_data.width(),
            },
            raw_inspection: result.raw_inspection.clone(),
            cleaned_inspection: result.cleaned_inspection.clone(),
            cleaning: result.cleaning.clone(),
            sales: result.sales.clone(),
            charts: result
                .charts
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            duration_ms: result.duration_ms,
        }
    }

    /// Write the report as pretty JSON to `sales_report.json`.
    pub fn write_report_to_file(&self, report: &AnalysisReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(REPORT_FILE);
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }

    /// Write the cleaned table to `cleaned_sales.csv`.
    pub fn write_cleaned_csv(&self, df: &DataFrame) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let output_path = self.output_dir.join(CLEANED_CSV_FILE);
        let mut file = File::create(&output_path)?;
        let mut df = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut df)?;

        info!("Dataset saved: {}", output_path.display());
        Ok(output_path)
    }
}
