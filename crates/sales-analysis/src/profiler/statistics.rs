//! Descriptive statistics for column inspection.

use crate::utils::{numeric_values, quantile_sorted, string_value_counts};
use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Describe block of a numeric column.
///
/// Quantiles use linear interpolation; `std` is the sample standard
/// deviation and is `None` below two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Describe block of a text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    /// Most frequent value; ties go to the smallest value.
    pub top: Option<String>,
    pub freq: usize,
}

pub(crate) fn describe_numeric(series: &Series) -> Result<NumericSummary> {
    let float_series = series.cast(&DataType::Float64)?;
    let mut values = numeric_values(&float_series)?;
    values.sort_by(|a, b| a.total_cmp(b));

    Ok(NumericSummary {
        column: series.name().to_string(),
        count: values.len(),
        mean: float_series.mean(),
        std: float_series.std(1),
        min: values.first().copied(),
        q25: quantile_sorted(&values, 0.25),
        median: float_series.median(),
        q75: quantile_sorted(&values, 0.75),
        max: values.last().copied(),
    })
}

pub(crate) fn describe_categorical(series: &Series) -> Result<CategoricalSummary> {
    let counts = string_value_counts(series)?;
    let top = counts
        .iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
        })
        .map(|(val, count)| (val.clone(), *count));

    Ok(CategoricalSummary {
        column: series.name().to_string(),
        count: counts.values().sum(),
        unique: counts.len(),
        freq: top.as_ref().map(|(_, c)| *c).unwrap_or(0),
        top: top.map(|(v, _)| v),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_numeric() {
        let series = Series::new("q".into(), &[Some(4.0), None, Some(1.0), Some(2.0), Some(3.0)]);
        let summary = describe_numeric(&series).unwrap();

        assert_eq!(summary.column, "q");
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, Some(2.5));
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.q25, Some(1.75));
        assert_eq!(summary.median, Some(2.5));
        assert_eq!(summary.q75, Some(3.25));
        assert_eq!(summary.max, Some(4.0));
        assert!((summary.std.unwrap() - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_describe_numeric_integer_column() {
        let series = Series::new("id".into(), &[100i64, 150]);
        let summary = describe_numeric(&series).unwrap();
        assert_eq!(summary.mean, Some(125.0));
    }

    #[test]
    fn test_describe_numeric_empty() {
        let series = Series::new("q".into(), &[Option::<f64>::None]);
        let summary = describe_numeric(&series).unwrap();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.std, None);
        assert_eq!(summary.max, None);
    }

    #[test]
    fn test_describe_categorical() {
        let series = Series::new(
            "status".into(),
            &[Some("Delivered"), Some("Pending"), None, Some("Delivered")],
        );
        let summary = describe_categorical(&series).unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.unique, 2);
        assert_eq!(summary.top.as_deref(), Some("Delivered"));
        assert_eq!(summary.freq, 2);
    }
}
