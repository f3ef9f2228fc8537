use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::aggregation::SalesSummary;
use crate::fixture::DefectLog;
use crate::profiler::DatasetInspection;

/// Column names of the sale record table.
pub mod columns {
    pub const ORDER_ID: &str = "order_id";
    pub const PURCHASE_DATE: &str = "purchase_date";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const PRODUCT: &str = "product";
    pub const CATEGORY: &str = "category";
    pub const QUANTITY: &str = "quantity";
    pub const UNIT_PRICE: &str = "unit_price";
    pub const DELIVERY_STATUS: &str = "delivery_status";
    /// Derived after cleaning: quantity x unit price.
    pub const TOTAL_SALE: &str = "total_sale";

    /// Columns of a sale record in table order.
    pub const ALL: [&str; 8] = [
        ORDER_ID,
        PURCHASE_DATE,
        CUSTOMER_ID,
        PRODUCT,
        CATEGORY,
        QUANTITY,
        UNIT_PRICE,
        DELIVERY_STATUS,
    ];
}

/// Delivery state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Delivered,
    Pending,
    Canceled,
}

impl DeliveryStatus {
    /// All statuses, in declaration order.
    pub const ALL: [DeliveryStatus; 3] = [Self::Delivered, Self::Pending, Self::Canceled];

    /// Text stored in the `delivery_status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "Delivered",
            Self::Pending => "Pending",
            Self::Canceled => "Canceled",
        }
    }

    /// Parse the text stored in the `delivery_status` column.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value.trim())
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single action taken during cleaning.
///
/// Actions are logged throughout the pipeline execution to provide
/// an audit trail of what was done to the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningAction {
    /// Type of action performed.
    pub action_type: ActionType,
    /// Target of the action (column name or "dataset").
    pub target: String,
    /// Human-readable description of the action.
    pub description: String,
    /// Additional details (e.g., values replaced, threshold used).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CleaningAction {
    /// Create a new cleaning action.
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            details: None,
        }
    }

    /// Add details to the action.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Types of actions that can be taken during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A column's data type was coerced.
    TypeCorrected,
    /// Missing values were imputed.
    ValueImputed,
    /// Rows with unrecoverable nulls were removed.
    RowsRemoved,
    /// Duplicate rows were removed.
    DuplicatesRemoved,
    /// Outlier rows were trimmed.
    OutlierHandled,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TypeCorrected => "Type Corrected",
            Self::ValueImputed => "Value Imputed",
            Self::RowsRemoved => "Rows Removed",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::OutlierHandled => "Outlier Handled",
        }
    }
}

/// Summary of what the cleaner did to the table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Number of rows entering the cleaner.
    pub rows_before: usize,
    /// Number of rows leaving the cleaner.
    pub rows_after: usize,
    /// Values that failed numeric coercion, per column.
    pub coercion_failures: Vec<(String, usize)>,
    /// Median used to fill missing quantities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_median: Option<f64>,
    /// Number of quantities filled with the median.
    pub quantities_imputed: usize,
    /// Most frequent status used to fill missing statuses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_mode: Option<String>,
    /// Number of statuses filled with the mode.
    pub statuses_imputed: usize,
    /// Rows dropped for a null unit price or customer id.
    pub unrecoverable_rows_removed: usize,
    /// Exact duplicate rows dropped.
    pub duplicates_removed: usize,
    /// Quantity threshold of the outlier rule, if it could be computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlier_threshold: Option<f64>,
    /// Rows dropped by the outlier rule.
    pub outliers_removed: usize,
    /// Audit trail, in execution order.
    pub actions: Vec<CleaningAction>,
}

impl CleaningSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the summary.
    pub fn add_action(&mut self, action: CleaningAction) {
        self.actions.push(action);
    }

    /// Total number of rows removed by the cleaner.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Percentage of rows removed by the cleaner.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed() as f64 / self.rows_before as f64) * 100.0
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The generated table, defects included.
    pub raw_data: DataFrame,
    /// Defects planted into the raw table.
    pub defects: DefectLog,
    /// The cleaned table with the derived `total_sale` column.
    pub cleaned_data: DataFrame,
    /// Diagnostics of the raw table.
    pub raw_inspection: DatasetInspection,
    /// Diagnostics of the cleaned table.
    pub cleaned_inspection: DatasetInspection,
    /// What the cleaner did.
    pub cleaning: CleaningSummary,
    /// Revenue and quantity aggregations.
    pub sales: SalesSummary,
    /// Charts written to disk.
    pub charts: Vec<PathBuf>,
    /// Report and cleaned CSV written to disk.
    pub written_files: Vec<PathBuf>,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}
