//! Read-only inspection of the sales table.
//!
//! Produces the diagnostics printed before and after cleaning:
//! - shape and head/tail previews
//! - data types and missing-value counts
//! - exact duplicate rows
//! - numeric and categorical describe blocks

mod statistics;

pub use statistics::{CategoricalSummary, NumericSummary};

use crate::utils::{count_duplicate_rows, dtype_category_str, get_dtype_category, DtypeCategory};
use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Rows shown in the head and tail previews.
pub const PREVIEW_ROWS: usize = 5;

/// Type and null information for one column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInspection {
    pub name: String,
    pub dtype: String,
    pub category: String,
    pub null_count: usize,
    pub null_percentage: f64,
}

/// Diagnostics of one table.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInspection {
    pub shape: (usize, usize),
    pub columns: Vec<ColumnInspection>,
    pub duplicate_count: usize,
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
    #[serde(skip)]
    pub head: DataFrame,
    #[serde(skip)]
    pub tail: DataFrame,
}

impl DatasetInspection {
    /// Null count of `column`, if it exists.
    pub fn null_count(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.null_count)
    }

    /// Nulls across all columns.
    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }

    pub fn numeric_summary(&self, column: &str) -> Option<&NumericSummary> {
        self.numeric.iter().find(|s| s.column == column)
    }

    pub fn categorical_summary(&self, column: &str) -> Option<&CategoricalSummary> {
        self.categorical.iter().find(|s| s.column == column)
    }
}

/// Inspector for the sales table.
pub struct DataInspector;

impl DataInspector {
    /// Inspect `df` with the default preview size.
    pub fn inspect(df: &DataFrame) -> Result<DatasetInspection> {
        Self::inspect_with_preview(df, PREVIEW_ROWS)
    }

    /// Inspect `df`, keeping `preview_rows` rows in the head and tail previews.
    pub fn inspect_with_preview(df: &DataFrame, preview_rows: usize) -> Result<DatasetInspection> {
        let height = df.height();
        let mut columns = Vec::with_capacity(df.width());
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let null_count = series.null_count();
            columns.push(ColumnInspection {
                name: series.name().to_string(),
                dtype: series.dtype().to_string(),
                category: dtype_category_str(series).to_string(),
                null_count,
                null_percentage: if height > 0 {
                    (null_count as f64 / height as f64) * 100.0
                } else {
                    0.0
                },
            });

            match get_dtype_category(series.dtype()) {
                DtypeCategory::Numeric => numeric.push(statistics::describe_numeric(series)?),
                DtypeCategory::String => {
                    categorical.push(statistics::describe_categorical(series)?)
                }
                _ => {}
            }
        }

        let duplicate_count = count_duplicate_rows(df)?;
        debug!(
            "Inspected {:?}: {} nulls, {} duplicates",
            df.shape(),
            columns.iter().map(|c| c.null_count).sum::<usize>(),
            duplicate_count
        );

        Ok(DatasetInspection {
            shape: df.shape(),
            columns,
            duplicate_count,
            numeric,
            categorical,
            head: df.head(Some(preview_rows)),
            tail: df.tail(Some(preview_rows)),
        })
    }
}
