//! Outlier handling module.
//!
//! Trims rows whose value in a numeric column reaches `mean + sigma * std`.

use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Result of one trimming pass.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierTrim {
    /// `None` when fewer than two values were present.
    pub threshold: Option<f64>,
    pub rows_removed: usize,
}

/// Handles outlier detection and treatment.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Upper threshold of the sigma rule over the non-null values of `series`.
    ///
    /// The standard deviation is the sample one (n - 1), so fewer than two
    /// values give no threshold.
    pub fn sigma_threshold(series: &Series, sigma: f64) -> Result<Option<f64>> {
        let float_series = series.cast(&DataType::Float64)?;
        let (Some(mean), Some(std)) = (float_series.mean(), float_series.std(1)) else {
            return Ok(None);
        };
        Ok(Some(mean + sigma * std))
    }

    /// Keep rows whose `col_name` value is strictly below the threshold.
    ///
    /// The threshold is computed from the column as it is now. Null values
    /// are kept. A constant column sits exactly on its threshold, so every
    /// non-null row goes.
    pub fn trim_upper(df: &mut DataFrame, col_name: &str, sigma: f64) -> Result<OutlierTrim> {
        let series = df.column(col_name)?.as_materialized_series();
        let Some(threshold) = Self::sigma_threshold(series, sigma)? else {
            debug!("Too few values in '{}' to trim outliers", col_name);
            return Ok(OutlierTrim {
                threshold: None,
                rows_removed: 0,
            });
        };

        let float_series = series.cast(&DataType::Float64)?;
        let mask_values: Vec<bool> = float_series
            .f64()?
            .into_iter()
            .map(|v| v.map(|val| val < threshold).unwrap_or(true))
            .collect();

        let original_rows = df.height();
        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        *df = df.filter(&mask)?;
        let rows_removed = original_rows - df.height();

        debug!(
            "Removed {} rows with {} >= {:.3}",
            rows_removed, col_name, threshold
        );
        Ok(OutlierTrim {
            threshold: Some(threshold),
            rows_removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantities(df: &DataFrame) -> Vec<f64> {
        df.column("quantity")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_trims_clear_outlier() {
        let mut values = vec![2.0; 20];
        values.push(50.0);
        let mut df = df!["quantity" => values].unwrap();

        let trim = OutlierHandler::trim_upper(&mut df, "quantity", 3.0).unwrap();

        assert_eq!(trim.rows_removed, 1);
        assert_eq!(df.height(), 20);
        assert!(quantities(&df).iter().all(|q| *q == 2.0));
    }

    #[test]
    fn test_small_sample_keeps_extreme_value() {
        // mean 11.6, sample std ~21.5, threshold ~76
        let mut df = df!["quantity" => [1.0, 2.0, 2.0, 3.0, 50.0]].unwrap();

        let trim = OutlierHandler::trim_upper(&mut df, "quantity", 3.0).unwrap();

        assert!(trim.threshold.unwrap() > 50.0);
        assert_eq!(trim.rows_removed, 0);
        assert_eq!(df.height(), 5);
    }

    #[test]
    fn test_threshold_uses_sample_std() {
        let series = Series::new("q".into(), &[Some(1.0), None, Some(2.0), Some(3.0), Some(4.0), Some(5.0)]);
        let threshold = OutlierHandler::sigma_threshold(&series, 2.0).unwrap().unwrap();
        assert!((threshold - (3.0 + 2.0 * 2.5f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_trimmed_at_its_mean() {
        let mut df = df!["quantity" => [2.0, 2.0, 2.0, 2.0]].unwrap();
        let trim = OutlierHandler::trim_upper(&mut df, "quantity", 3.0).unwrap();
        assert_eq!(trim.threshold, Some(2.0));
        assert_eq!(trim.rows_removed, 4);
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn test_single_value_is_not_trimmed() {
        let mut df = df!["quantity" => [7.0]].unwrap();
        let trim = OutlierHandler::trim_upper(&mut df, "quantity", 3.0).unwrap();
        assert_eq!(trim.threshold, None);
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn test_null_values_are_kept() {
        let mut df = df!["quantity" => [Some(1.0), None, Some(1.5)]].unwrap();
        OutlierHandler::trim_upper(&mut df, "quantity", 3.0).unwrap();
        assert_eq!(df.height(), 3);
    }
}
