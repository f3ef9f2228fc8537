//! Shared utilities for the sales analysis pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for reporting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Get the dtype category of a Series as a string.
pub fn dtype_category_str(series: &Series) -> &'static str {
    match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric => "numeric",
        DtypeCategory::Datetime => "datetime",
        DtypeCategory::Boolean => "binary",
        DtypeCategory::String => "string",
        DtypeCategory::Other => "other",
    }
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Common error/missing value markers in data.
pub const ERROR_MARKERS: [&str; 9] = [
    "error", "unknown", "n/a", "na", "nan", "null", "missing", "none", "#n/a",
];

/// Check if a string is an error/missing value marker.
///
/// # Example
///
/// ```rust,ignore
/// use sales_analysis::utils::is_error_marker;
///
/// assert!(is_error_marker("NaN"));
/// assert!(is_error_marker("N/A"));
/// assert!(!is_error_marker("42"));
/// ```
pub fn is_error_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    ERROR_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a finite numeric value (f64).
///
/// Empty strings, error markers and anything that is not a plain number
/// yield `None`; the caller turns that into a null.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || is_error_marker(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Try to parse a string as an integer, accepting integral floats like `"123.0"`.
pub fn parse_integer_string(s: &str) -> Option<i64> {
    if let Ok(v) = s.trim().parse::<i64>() {
        return Some(v);
    }
    parse_numeric_string(s)
        .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Collect the non-null values of a numeric Series as `f64`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().flatten().collect())
}

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be sorted ascending; `q` is clamped to `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Count occurrences of each non-null string value.
pub fn string_value_counts(series: &Series) -> PolarsResult<HashMap<String, usize>> {
    let str_series = series.cast(&DataType::String)?;
    let mut value_counts: HashMap<String, usize> = HashMap::new();
    for val in str_series.str()?.into_iter().flatten() {
        *value_counts.entry(val.to_string()).or_insert(0) += 1;
    }
    Ok(value_counts)
}

/// Calculate the mode (most frequent value) of a string Series.
///
/// Ties resolve to the lexicographically smallest value so the result does
/// not depend on hash ordering.
pub fn string_mode(series: &Series) -> Option<String> {
    let value_counts = string_value_counts(series).ok()?;
    value_counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
        })
        .map(|(val, _)| val)
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// Returns the filled Float64 series and the number of values filled.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<(Series, usize)> {
    let float_series = series.cast(&DataType::Float64)?;
    let mut filled = 0;
    let values: Vec<Option<f64>> = float_series
        .f64()?
        .into_iter()
        .map(|v| {
            if v.is_none() {
                filled += 1;
            }
            Some(v.unwrap_or(fill_value))
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), filled))
}

/// Fill null values in a string Series with a specific value.
///
/// Returns the filled series and the number of values filled.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<(Series, usize)> {
    let str_series = series.cast(&DataType::String)?;
    let mut filled = 0;
    let values: Vec<Option<String>> = str_series
        .str()?
        .into_iter()
        .map(|v| match v {
            Some(val) => Some(val.to_string()),
            None => {
                filled += 1;
                Some(fill_value.to_string())
            }
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), filled))
}

// =============================================================================
// Row Utilities
// =============================================================================

/// Drop rows that repeat an earlier row across all columns.
///
/// Nulls compare equal to nulls. First occurrences keep their order.
pub fn drop_duplicate_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.unique_stable(None, UniqueKeepStrategy::First, None)
}

/// Count rows that repeat an earlier row across all columns.
pub fn count_duplicate_rows(df: &DataFrame) -> PolarsResult<usize> {
    Ok(df.height() - drop_duplicate_rows(df)?.height())
}

// =============================================================================
// Date Utilities
// =============================================================================

/// Days from 0001-01-01 (day 1) to 1970-01-01.
const UNIX_EPOCH_DAY_FROM_CE: i32 = 719_163;

/// Convert a date to the physical representation of a polars `Date`.
pub fn date_to_epoch_days(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAY_FROM_CE
}

/// Convert the physical representation of a polars `Date` back to a date.
pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAY_FROM_CE)
}

/// Build a polars `Date` series from calendar dates.
pub fn date_series(name: &str, dates: &[NaiveDate]) -> PolarsResult<Series> {
    let days: Vec<i32> = dates.iter().map(|d| date_to_epoch_days(*d)).collect();
    Series::new(name.into(), days).cast(&DataType::Date)
}

/// Read a polars `Date` series back as calendar dates.
pub fn series_dates(series: &Series) -> PolarsResult<Vec<Option<NaiveDate>>> {
    let days = series.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(epoch_days_to_date))
        .collect())
}

// =============================================================================
// Tests
// =============================================================================
