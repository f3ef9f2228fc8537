//! Revenue and quantity aggregations over the cleaned sales table.
//!
//! All views are read-only; only [`SalesAggregator::add_total_sale`] returns
//! a new table, with the derived `total_sale` column appended.

use crate::types::columns;
use crate::utils::{date_series, is_numeric_dtype, numeric_values, series_dates};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Sum of a value for one group key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: String,
    pub value: f64,
}

/// Sum of a value for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub value: f64,
}

/// All aggregations of one cleaned table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesSummary {
    pub order_count: usize,
    pub total_revenue: f64,
    pub total_quantity: f64,
    /// Descending by revenue.
    pub revenue_by_category: Vec<GroupTotal>,
    /// Descending by quantity.
    pub quantity_by_product: Vec<GroupTotal>,
    /// Chronological, one entry per calendar day between the first and last sale.
    pub revenue_by_day: Vec<DailyTotal>,
    /// Order counts per delivery status, descending.
    pub status_distribution: Vec<GroupTotal>,
}

/// Aggregations over the sales table.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Return a copy of `df` with `total_sale = quantity * unit_price`.
    pub fn add_total_sale(df: &DataFrame) -> Result<DataFrame> {
        let totals = Self::row_totals(df)?;
        let mut out = df.clone();
        out.with_column(Series::new(columns::TOTAL_SALE.into(), totals))?;
        Ok(out)
    }

    /// Grand total of all sales.
    pub fn total_revenue(df: &DataFrame) -> Result<f64> {
        Ok(Self::sale_amounts(df)?.into_iter().flatten().sum())
    }

    /// Revenue per category, highest first.
    pub fn revenue_by_category(df: &DataFrame) -> Result<Vec<GroupTotal>> {
        let keys = Self::keys(df, columns::CATEGORY)?;
        Ok(sorted_totals(sum_by_key(&keys, &Self::sale_amounts(df)?)))
    }

    /// Units sold per product, highest first.
    pub fn quantity_by_product(df: &DataFrame) -> Result<Vec<GroupTotal>> {
        let keys = Self::keys(df, columns::PRODUCT)?;
        let quantities = Self::column_f64(df, columns::QUANTITY)?;
        Ok(sorted_totals(sum_by_key(&keys, &quantities)))
    }

    /// Revenue per calendar day.
    ///
    /// Days between the first and the last sale without any sale appear
    /// with a total of zero.
    pub fn revenue_by_day(df: &DataFrame) -> Result<Vec<DailyTotal>> {
        let dates = series_dates(df.column(columns::PURCHASE_DATE)?.as_materialized_series())?;
        let amounts = Self::sale_amounts(df)?;

        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, amount) in dates.into_iter().zip(amounts) {
            if let (Some(date), Some(amount)) = (date, amount) {
                *by_day.entry(date).or_insert(0.0) += amount;
            }
        }

        let (Some(first), Some(last)) = (
            by_day.keys().next().copied(),
            by_day.keys().next_back().copied(),
        ) else {
            return Ok(Vec::new());
        };

        Ok(first
            .iter_days()
            .take_while(|day| *day <= last)
            .map(|date| DailyTotal {
                date,
                value: by_day.get(&date).copied().unwrap_or(0.0),
            })
            .collect())
    }

    /// Number of orders per delivery status, most common first.
    pub fn status_distribution(df: &DataFrame) -> Result<Vec<GroupTotal>> {
        let keys = Self::keys(df, columns::DELIVERY_STATUS)?;
        let ones = vec![Some(1.0); keys.len()];
        Ok(sorted_totals(sum_by_key(&keys, &ones)))
    }

    /// Compute every aggregation at once.
    pub fn summarize(df: &DataFrame) -> Result<SalesSummary> {
        let summary = SalesSummary {
            order_count: df.height(),
            total_revenue: Self::total_revenue(df)?,
            total_quantity: numeric_values(df.column(columns::QUANTITY)?.as_materialized_series())?
                .iter()
                .sum(),
            revenue_by_category: Self::revenue_by_category(df)?,
            quantity_by_product: Self::quantity_by_product(df)?,
            revenue_by_day: Self::revenue_by_day(df)?,
            status_distribution: Self::status_distribution(df)?,
        };
        debug!(
            "Aggregated {} orders: revenue {:.2}, {} days",
            summary.order_count,
            summary.total_revenue,
            summary.revenue_by_day.len()
        );
        Ok(summary)
    }

    /// Per-row sale amounts: the `total_sale` column if present, otherwise
    /// computed from quantity and unit price.
    fn sale_amounts(df: &DataFrame) -> Result<Vec<Option<f64>>> {
        if df.get_column_index(columns::TOTAL_SALE).is_some() {
            Self::column_f64(df, columns::TOTAL_SALE)
        } else {
            Self::row_totals(df)
        }
    }

    fn row_totals(df: &DataFrame) -> Result<Vec<Option<f64>>> {
        let quantities = Self::column_f64(df, columns::QUANTITY)?;
        let prices = Self::column_f64(df, columns::UNIT_PRICE)?;
        Ok(quantities
            .into_iter()
            .zip(prices)
            .map(|(q, p)| Some(q? * p?))
            .collect())
    }

    fn column_f64(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
        let series = df.column(column)?.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            bail!("column '{}' is {}, expected a number", column, series.dtype());
        }
        let float_series = series.cast(&DataType::Float64)?;
        Ok(float_series.f64()?.into_iter().collect())
    }

    fn keys(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
        let series = df.column(column)?.as_materialized_series();
        Ok(series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }
}

/// Sum `values` per key, skipping rows where either side is null.
fn sum_by_key(keys: &[Option<String>], values: &[Option<f64>]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for (key, value) in keys.iter().zip(values) {
        if let (Some(key), Some(value)) = (key, value) {
            *totals.entry(key.clone()).or_insert(0.0) += value;
        }
    }
    totals
}

/// Descending by value; equal values are ordered by key.
fn sorted_totals(totals: HashMap<String, f64>) -> Vec<GroupTotal> {
    let mut out: Vec<GroupTotal> = totals
        .into_iter()
        .map(|(key, value)| GroupTotal { key, value })
        .collect();
    out.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    out
}

/// Two-column table of grouped totals, for console display.
pub fn group_totals_frame(key_name: &str, value_name: &str, totals: &[GroupTotal]) -> PolarsResult<DataFrame> {
    let keys: Vec<&str> = totals.iter().map(|t| t.key.as_str()).collect();
    let values: Vec<f64> = totals.iter().map(|t| t.value).collect();
    DataFrame::new(vec![
        Series::new(key_name.into(), keys).into(),
        Series::new(value_name.into(), values).into(),
    ])
}

/// Two-column table of daily totals, for console display.
pub fn daily_totals_frame(value_name: &str, totals: &[DailyTotal]) -> PolarsResult<DataFrame> {
    let dates: Vec<NaiveDate> = totals.iter().map(|t| t.date).collect();
    let values: Vec<f64> = totals.iter().map(|t| t.value).collect();
    DataFrame::new(vec![
        date_series(columns::PURCHASE_DATE, &dates)?.into(),
        Series::new(value_name.into(), values).into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, d).unwrap()
    }

    fn sales() -> DataFrame {
        let dates = date_series(columns::PURCHASE_DATE, &[day(1), day(1), day(3), day(4)]).unwrap();
        let mut df = df![
            columns::PRODUCT => ["Notebook", "Headphones", "Notebook", "Smartwatch"],
            columns::CATEGORY => ["Electronics", "Accessories", "Electronics", "Accessories"],
            columns::QUANTITY => [1.0, 2.0, 2.0, 1.0],
            columns::UNIT_PRICE => [100.0, 25.0, 100.0, 50.0],
            columns::DELIVERY_STATUS => ["Delivered", "Pending", "Delivered", "Canceled"],
        ]
        .unwrap();
        df.with_column(dates).unwrap();
        df
    }

    #[test]
    fn test_add_total_sale() {
        let df = SalesAggregator::add_total_sale(&sales()).unwrap();
        let totals: Vec<f64> = df
            .column(columns::TOTAL_SALE)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(totals, vec![100.0, 50.0, 200.0, 50.0]);
    }

    #[test]
    fn test_total_revenue_matches_category_sum() {
        let df = SalesAggregator::add_total_sale(&sales()).unwrap();
        let total = SalesAggregator::total_revenue(&df).unwrap();
        let by_category: f64 = SalesAggregator::revenue_by_category(&df)
            .unwrap()
            .iter()
            .map(|g| g.value)
            .sum();
        assert_eq!(total, 400.0);
        assert_eq!(by_category, total);
    }

    #[test]
    fn test_revenue_by_category_two_rows() {
        let df = df![
            columns::CATEGORY => ["Accessories", "Electronics"],
            columns::QUANTITY => [1.0, 1.0],
            columns::UNIT_PRICE => [50.0, 100.0],
        ]
        .unwrap();

        let by_category = SalesAggregator::revenue_by_category(&df).unwrap();
        assert_eq!(
            by_category,
            vec![
                GroupTotal { key: "Electronics".to_string(), value: 100.0 },
                GroupTotal { key: "Accessories".to_string(), value: 50.0 },
            ]
        );
        assert_eq!(SalesAggregator::total_revenue(&df).unwrap(), 150.0);
    }

    #[test]
    fn test_ties_are_ordered_by_key() {
        let df = df![
            columns::PRODUCT => ["b", "a", "c"],
            columns::QUANTITY => [2.0, 2.0, 5.0],
        ]
        .unwrap();
        let keys: Vec<String> = SalesAggregator::quantity_by_product(&df)
            .unwrap()
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_quantity_by_product() {
        let by_product = SalesAggregator::quantity_by_product(&sales()).unwrap();
        assert_eq!(by_product[0], GroupTotal { key: "Notebook".to_string(), value: 3.0 });
        let total: f64 = by_product.iter().map(|g| g.value).sum();
        assert_eq!(total, 6.0);
    }

    #[test]
    fn test_revenue_by_day_is_dense() {
        let df = SalesAggregator::add_total_sale(&sales()).unwrap();
        let by_day = SalesAggregator::revenue_by_day(&df).unwrap();

        assert_eq!(
            by_day,
            vec![
                DailyTotal { date: day(1), value: 150.0 },
                DailyTotal { date: day(2), value: 0.0 },
                DailyTotal { date: day(3), value: 200.0 },
                DailyTotal { date: day(4), value: 50.0 },
            ]
        );
    }

    #[test]
    fn test_revenue_by_day_empty() {
        let df = sales().head(Some(0));
        assert!(SalesAggregator::revenue_by_day(&df).unwrap().is_empty());
    }

    #[test]
    fn test_status_distribution() {
        let by_status = SalesAggregator::status_distribution(&sales()).unwrap();
        assert_eq!(by_status[0], GroupTotal { key: "Delivered".to_string(), value: 2.0 });
        assert_eq!(by_status.len(), 3);
    }

    #[test]
    fn test_text_price_is_rejected() {
        let df = df![
            columns::CATEGORY => ["Accessories"],
            columns::QUANTITY => [1.0],
            columns::UNIT_PRICE => ["50.0"],
        ]
        .unwrap();
        assert!(SalesAggregator::total_revenue(&df).is_err());
    }

    #[test]
    fn test_summarize() {
        let summary = SalesAggregator::summarize(&sales()).unwrap();
        assert_eq!(summary.order_count, 4);
        assert_eq!(summary.total_revenue, 400.0);
        assert_eq!(summary.total_quantity, 6.0);
        assert_eq!(summary.revenue_by_day.len(), 4);
    }

    #[test]
    fn test_frames() {
        let summary = SalesAggregator::summarize(&sales()).unwrap();
        let frame = group_totals_frame("category", "revenue", &summary.revenue_by_category).unwrap();
        assert_eq!(frame.shape(), (2, 2));

        let daily = daily_totals_frame("revenue", &summary.revenue_by_day).unwrap();
        assert_eq!(daily.shape(), (4, 2));
        assert_eq!(daily.column(columns::PURCHASE_DATE).unwrap().dtype(), &DataType::Date);
    }
}
