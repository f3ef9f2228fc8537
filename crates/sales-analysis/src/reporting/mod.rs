//! Report generation module.
//!
//! Builds the JSON report of a run and writes it, together with the
//! cleaned table as CSV, into the output directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_analysis::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report(&result, &config);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::new(PathBuf::from("outputs"));
//! generator.write_report_to_file(&report)?;
//! generator.write_cleaned_csv(&result.cleaned_data)?;
//! ```

mod generator;

pub use generator::{AnalysisReport, CLEANED_CSV_FILE, REPORT_FILE, ReportGenerator, ShapeChange};
