//! Data cleaning module for the sales table.
//!
//! The stages run in a fixed order:
//! 1. Type coercion of unit price and customer id
//! 2. Median/mode imputation of quantity and delivery status
//! 3. Removal of rows with a null unit price or customer id
//! 4. Removal of exact duplicate rows
//! 5. Outlier trimming on quantity
//!
//! Every stage is a no-op on an already-clean table.

mod converters;

use crate::imputers::StatisticalImputer;
use crate::pipeline::OutlierHandler;
use crate::types::{ActionType, CleaningAction, CleaningSummary, columns};
use crate::utils::drop_duplicate_rows;
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for the sales table.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    outlier_sigma: f64,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_OUTLIER_SIGMA)
    }
}

impl DataCleaner {
    pub fn new(outlier_sigma: f64) -> Self {
        Self { outlier_sigma }
    }

    /// Run every stage and return the cleaned table with its summary.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        let mut df = df;
        let mut summary = CleaningSummary::new();
        summary.rows_before = df.height();

        info!("Cleaning {} rows...", df.height());
        self.coerce_types(&mut df, &mut summary)?;
        self.impute_missing(&mut df, &mut summary)?;
        self.drop_unrecoverable(&mut df, &mut summary)?;
        self.remove_duplicates(&mut df, &mut summary)?;
        self.trim_outliers(&mut df, &mut summary)?;

        summary.rows_after = df.height();
        info!(
            "Cleaning finished: {} -> {} rows",
            summary.rows_before, summary.rows_after
        );
        Ok((df, summary))
    }

    /// Stage 1: parse unit price as Float64 and customer id as Int64.
    pub fn coerce_types(&self, df: &mut DataFrame, summary: &mut CleaningSummary) -> Result<()> {
        for (column, dtype) in [
            (columns::UNIT_PRICE, DataType::Float64),
            (columns::CUSTOMER_ID, DataType::Int64),
        ] {
            let before = df.column(column)?.dtype().clone();
            let failures = converters::coerce_column(df, column, &dtype)?;
            summary.coercion_failures.push((column.to_string(), failures));

            if before != dtype {
                summary.add_action(
                    CleaningAction::new(
                        ActionType::TypeCorrected,
                        column,
                        format!("Converted from {} to {}", before, dtype),
                    )
                    .with_details(format!("{} unparseable values set to null", failures)),
                );
            }
            debug!("Coerced '{}' to {} ({} failures)", column, dtype, failures);
        }
        Ok(())
    }

    /// Stage 2: fill quantity with the median and delivery status with the mode.
    ///
    /// The median is taken over every non-null quantity, outliers included.
    pub fn impute_missing(&self, df: &mut DataFrame, summary: &mut CleaningSummary) -> Result<()> {
        if let Some(imputed) = StatisticalImputer::apply_numeric_median(df, columns::QUANTITY)? {
            summary.quantity_median = Some(imputed.value);
            summary.quantities_imputed = imputed.filled;
            if imputed.filled > 0 {
                summary.add_action(
                    CleaningAction::new(
                        ActionType::ValueImputed,
                        columns::QUANTITY,
                        format!("Filled {} missing values with median", imputed.filled),
                    )
                    .with_details(format!("median = {}", imputed.value)),
                );
            }
        }

        if let Some(imputed) = StatisticalImputer::apply_mode_imputation(df, columns::DELIVERY_STATUS)? {
            summary.statuses_imputed = imputed.filled;
            if imputed.filled > 0 {
                summary.add_action(
                    CleaningAction::new(
                        ActionType::ValueImputed,
                        columns::DELIVERY_STATUS,
                        format!("Filled {} missing values with mode", imputed.filled),
                    )
                    .with_details(format!("mode = '{}'", imputed.value)),
                );
            }
            summary.status_mode = Some(imputed.value);
        }
        Ok(())
    }

    /// Stage 3: drop rows whose unit price or customer id is still null.
    pub fn drop_unrecoverable(&self, df: &mut DataFrame, summary: &mut CleaningSummary) -> Result<()> {
        let price = df.column(columns::UNIT_PRICE)?.as_materialized_series();
        let customer = df.column(columns::CUSTOMER_ID)?.as_materialized_series();
        let mask = &price.is_not_null() & &customer.is_not_null();

        let before = df.height();
        *df = df.filter(&mask)?;
        let removed = before - df.height();
        summary.unrecoverable_rows_removed = removed;

        if removed > 0 {
            summary.add_action(CleaningAction::new(
                ActionType::RowsRemoved,
                "dataset",
                format!(
                    "Removed {} rows with missing {} or {}",
                    removed,
                    columns::UNIT_PRICE,
                    columns::CUSTOMER_ID
                ),
            ));
        }
        debug!("Removed {} unrecoverable rows", removed);
        Ok(())
    }

    /// Stage 4: drop exact duplicate rows, keeping the first occurrence.
    pub fn remove_duplicates(&self, df: &mut DataFrame, summary: &mut CleaningSummary) -> Result<()> {
        let before = df.height();
        *df = drop_duplicate_rows(df)?;
        let removed = before - df.height();
        summary.duplicates_removed = removed;

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            summary.add_action(CleaningAction::new(
                ActionType::DuplicatesRemoved,
                "dataset",
                format!("Removed {} duplicate rows ({:.1}%)", removed, pct),
            ));
        }
        debug!("Removed {} duplicate rows", removed);
        Ok(())
    }

    /// Stage 5: drop rows with quantity at or above `mean + sigma * std`.
    pub fn trim_outliers(&self, df: &mut DataFrame, summary: &mut CleaningSummary) -> Result<()> {
        let trim = OutlierHandler::trim_upper(df, columns::QUANTITY, self.outlier_sigma)?;
        summary.outlier_threshold = trim.threshold;
        summary.outliers_removed = trim.rows_removed;

        if let Some(threshold) = trim.threshold {
            let action = CleaningAction::new(
                ActionType::OutlierHandled,
                columns::QUANTITY,
                format!("Removed {} rows above the {}-sigma limit", trim.rows_removed, self.outlier_sigma),
            )
            .with_details(format!("threshold = {:.3}", threshold));
            summary.add_action(action);
        }
        Ok(())
    }
}
