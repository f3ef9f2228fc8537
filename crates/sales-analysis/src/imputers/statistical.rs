//! Statistical imputation methods.
//!
//! Provides median and mode imputation. The statistic is computed from the
//! non-null values currently in the column.

use crate::utils::{fill_numeric_nulls, fill_string_nulls, string_mode};
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Fill value used for a column and how many nulls it replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Imputed<T> {
    pub value: T,
    pub filled: usize,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill nulls of a numeric column with the median of its non-null values.
    ///
    /// Returns `None` when the column has no non-null value to take the
    /// median of; the column is left untouched in that case.
    pub fn apply_numeric_median(df: &mut DataFrame, col_name: &str) -> Result<Option<Imputed<f64>>> {
        let series = df.column(col_name)?.as_materialized_series();
        let Some(median_val) = series.cast(&DataType::Float64)?.median() else {
            debug!("No values to take the median of in '{}'", col_name);
            return Ok(None);
        };

        let (filled_series, filled) = fill_numeric_nulls(series, median_val)?;
        df.replace(col_name, filled_series)?;
        debug!("Filled {} nulls in '{}' with median {}", filled, col_name, median_val);

        Ok(Some(Imputed {
            value: median_val,
            filled,
        }))
    }

    /// Fill nulls of a text column with its most frequent value.
    ///
    /// Ties go to the lexicographically smallest value.
    pub fn apply_mode_imputation(df: &mut DataFrame, col_name: &str) -> Result<Option<Imputed<String>>> {
        let series = df.column(col_name)?.as_materialized_series();
        let Some(mode_val) = string_mode(series) else {
            debug!("No values to take the mode of in '{}'", col_name);
            return Ok(None);
        };

        let (filled_series, filled) = fill_string_nulls(series, &mode_val)?;
        df.replace(col_name, filled_series)?;
        debug!("Filled {} nulls in '{}' with mode '{}'", filled, col_name, mode_val);

        Ok(Some(Imputed {
            value: mode_val,
            filled,
        }))
    }
}
