//! Deliberate corruption of the generated sales table.
//!
//! Every defect lands at a fixed row index so the cleaner's behaviour can be
//! asserted exactly. Indices beyond the table height are skipped.

use crate::types::columns;
use anyhow::{Result, anyhow};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

/// Where and how the generated table gets corrupted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectPlan {
    /// Rows whose quantity becomes null.
    pub quantity_null_rows: RangeInclusive<usize>,
    /// Rows whose delivery status becomes null.
    pub status_null_rows: RangeInclusive<usize>,
    /// Row whose customer id becomes null.
    pub customer_null_row: Option<usize>,
    /// Number of leading rows appended again as exact duplicates.
    pub duplicated_head_rows: usize,
    /// Row whose unit price is replaced by a non-numeric token.
    pub invalid_price_row: Option<usize>,
    pub invalid_price_token: String,
    /// Row whose quantity becomes an extreme value.
    pub outlier_row: Option<usize>,
    pub outlier_quantity: f64,
}

impl Default for DefectPlan {
    fn default() -> Self {
        Self {
            quantity_null_rows: 5..=10,
            status_null_rows: 20..=22,
            customer_null_row: Some(30),
            duplicated_head_rows: 3,
            invalid_price_row: Some(15),
            invalid_price_token: "invalid_value".to_string(),
            outlier_row: Some(50),
            outlier_quantity: 50.0,
        }
    }
}

impl DefectPlan {
    /// A plan that leaves the table untouched, apart from the text columns.
    pub fn none() -> Self {
        Self {
            quantity_null_rows: RangeInclusive::new(1, 0),
            status_null_rows: RangeInclusive::new(1, 0),
            customer_null_row: None,
            duplicated_head_rows: 0,
            invalid_price_row: None,
            invalid_price_token: String::new(),
            outlier_row: None,
            outlier_quantity: 0.0,
        }
    }
}

/// What was actually injected. Skipped indices are not counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefectLog {
    pub quantities_nulled: usize,
    pub statuses_nulled: usize,
    pub customers_nulled: usize,
    pub duplicates_appended: usize,
    pub invalid_prices: usize,
    pub outliers_planted: usize,
}

impl DefectLog {
    /// Total number of injected defects.
    pub fn total(&self) -> usize {
        self.quantities_nulled
            + self.statuses_nulled
            + self.customers_nulled
            + self.duplicates_appended
            + self.invalid_prices
            + self.outliers_planted
    }
}

/// Apply `plan` to a clean fixture table.
///
/// Order matters: nulls first, then the head is appended (so duplicates are
/// exact copies of the possibly-corrupted first rows), then the text
/// conversions, then the outlier.
pub fn inject_defects(mut df: DataFrame, plan: &DefectPlan) -> Result<(DataFrame, DefectLog)> {
    let mut log = DefectLog::default();
    let height = df.height();

    let quantity_rows: Vec<usize> = plan
        .quantity_null_rows
        .clone()
        .filter(|i| *i < height)
        .collect();
    log.quantities_nulled = null_rows_f64(&mut df, columns::QUANTITY, &quantity_rows)?;

    let status_rows: Vec<usize> = plan
        .status_null_rows
        .clone()
        .filter(|i| *i < height)
        .collect();
    log.statuses_nulled = null_rows_str(&mut df, columns::DELIVERY_STATUS, &status_rows)?;

    let customer_rows: Vec<usize> = plan
        .customer_null_row
        .into_iter()
        .filter(|i| *i < height)
        .collect();
    log.customers_nulled = null_rows_i64(&mut df, columns::CUSTOMER_ID, &customer_rows)?;

    let head_rows = plan.duplicated_head_rows.min(height);
    if head_rows > 0 {
        let head = df.head(Some(head_rows));
        df = df.vstack(&head)?;
        log.duplicates_appended = head_rows;
    }

    log.invalid_prices = prices_to_text(&mut df, plan)?;
    customers_to_text(&mut df)?;

    if let Some(row) = plan.outlier_row.filter(|i| *i < df.height()) {
        let series = df.column(columns::QUANTITY)?.as_materialized_series();
        let values: Vec<Option<f64>> = series
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(i, v)| if i == row { Some(plan.outlier_quantity) } else { v })
            .collect();
        df.replace(columns::QUANTITY, Series::new(columns::QUANTITY.into(), values))?;
        log.outliers_planted = 1;
    }

    debug!("Injected defects: {:?}", log);
    Ok((df, log))
}

fn null_rows_f64(df: &mut DataFrame, column: &str, rows: &[usize]) -> Result<usize> {
    let series = df.column(column)?.as_materialized_series();
    let values: Vec<Option<f64>> = series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| if rows.contains(&i) { None } else { v })
        .collect();
    df.replace(column, Series::new(column.into(), values))?;
    Ok(rows.len())
}

fn null_rows_i64(df: &mut DataFrame, column: &str, rows: &[usize]) -> Result<usize> {
    let series = df.column(column)?.as_materialized_series();
    let values: Vec<Option<i64>> = series
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| if rows.contains(&i) { None } else { v })
        .collect();
    df.replace(column, Series::new(column.into(), values))?;
    Ok(rows.len())
}

fn null_rows_str(df: &mut DataFrame, column: &str, rows: &[usize]) -> Result<usize> {
    let series = df.column(column)?.as_materialized_series();
    let values: Vec<Option<String>> = series
        .str()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            if rows.contains(&i) {
                None
            } else {
                v.map(str::to_string)
            }
        })
        .collect();
    df.replace(column, Series::new(column.into(), values))?;
    Ok(rows.len())
}

/// Render unit prices as text and plant the invalid token.
fn prices_to_text(df: &mut DataFrame, plan: &DefectPlan) -> Result<usize> {
    let invalid_row = plan.invalid_price_row.filter(|i| *i < df.height());
    let series = df.column(columns::UNIT_PRICE)?.as_materialized_series();
    let values: Vec<Option<String>> = series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            if Some(i) == invalid_row {
                Some(plan.invalid_price_token.clone())
            } else {
                v.map(|price| format!("{:?}", price))
            }
        })
        .collect();
    df.replace(
        columns::UNIT_PRICE,
        Series::new(columns::UNIT_PRICE.into(), values),
    )?;
    Ok(usize::from(invalid_row.is_some()))
}

/// Render customer ids as text. A missing id becomes the literal `"nan"`.
fn customers_to_text(df: &mut DataFrame) -> Result<()> {
    let series = df.column(columns::CUSTOMER_ID)?.as_materialized_series();
    let values: Vec<String> = series
        .i64()
        .map_err(|e| anyhow!("customer ids must be integers before injection: {}", e))?
        .into_iter()
        .map(|v| match v {
            Some(id) => format!("{:.1}", id as f64),
            None => "nan".to_string(),
        })
        .collect();
    df.replace(
        columns::CUSTOMER_ID,
        Series::new(columns::CUSTOMER_ID.into(), values),
    )?;
    Ok(())
}
