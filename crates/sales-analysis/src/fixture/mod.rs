//! Synthetic sales fixture generation.
//!
//! Produces a reproducible table of sale records from a seeded
//! pseudo-random source, then corrupts it through [`defects`] so the
//! cleaner has something to do.

pub mod defects;

pub use defects::{DefectLog, DefectPlan};

use crate::config::PipelineConfig;
use crate::types::{DeliveryStatus, columns};
use crate::utils::date_series;
use anyhow::{Result, anyhow, bail};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use tracing::{debug, info};

/// One entry of the product catalogue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub name: &'static str,
    pub category: &'static str,
    pub unit_price: f64,
}

/// Product catalogue. Category and price are tied to the product.
pub const PRODUCTS: [Product; 5] = [
    Product {
        name: "Smartphone",
        category: "Electronics",
        unit_price: 5999.90,
    },
    Product {
        name: "Notebook",
        category: "Electronics",
        unit_price: 8500.00,
    },
    Product {
        name: "Headphones",
        category: "Accessories",
        unit_price: 799.50,
    },
    Product {
        name: "Smartwatch",
        category: "Accessories",
        unit_price: 2100.00,
    },
    Product {
        name: "Mechanical Keyboard",
        category: "Accessories",
        unit_price: 850.00,
    },
];

/// Sampling weights of the delivery statuses, parallel to [`DeliveryStatus::ALL`].
pub const STATUS_WEIGHTS: [f64; 3] = [0.80, 0.15, 0.05];

/// First order id of the generated table.
pub const FIRST_ORDER_ID: i64 = 1001;

/// Customer ids are drawn from `CUSTOMER_ID_RANGE`.
pub const CUSTOMER_ID_RANGE: std::ops::Range<i64> = 100..150;

/// Quantities are drawn from `QUANTITY_RANGE`.
pub const QUANTITY_RANGE: std::ops::Range<i64> = 1..5;

/// Settings of the fixture generator.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub seed: u64,
    pub row_count: usize,
    pub start_date: NaiveDate,
    pub date_jitter_days: u32,
    pub defects: DefectPlan,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for FixtureConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            seed: config.seed,
            row_count: config.row_count,
            start_date: config.start_date,
            date_jitter_days: config.date_jitter_days,
            defects: DefectPlan::default(),
        }
    }
}

/// Generates the synthetic sales table.
pub struct FixtureGenerator {
    config: FixtureConfig,
}

impl FixtureGenerator {
    pub fn new(config: FixtureConfig) -> Self {
        Self { config }
    }

    /// Generate the corrupted table the cleaner works on.
    pub fn generate(&self) -> Result<(DataFrame, DefectLog)> {
        info!(
            "Generating {} synthetic orders (seed {})...",
            self.config.row_count, self.config.seed
        );
        let df = self.clean_fixture()?;
        let (df, log) = defects::inject_defects(df, &self.config.defects)?;
        info!("Fixture ready: {:?} with injected defects", df.shape());
        Ok((df, log))
    }

    /// Generate the table without defects and with numeric types.
    ///
    /// Draws happen column by column from a single seeded generator, so the
    /// same seed always yields the same table.
    pub fn clean_fixture(&self) -> Result<DataFrame> {
        if self.config.date_jitter_days == 0 {
            bail!("date jitter must be at least 1 day");
        }
        let n = self.config.row_count;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let order_ids: Vec<i64> = (0..n as i64).map(|i| FIRST_ORDER_ID + i).collect();

        let mut dates = Vec::with_capacity(n);
        for i in 0..n {
            let jitter = rng.gen_range(0..self.config.date_jitter_days) as i64;
            let date = self
                .config
                .start_date
                .checked_add_signed(Duration::days(i as i64 - jitter))
                .ok_or_else(|| anyhow!("purchase date out of range at row {}", i))?;
            dates.push(date);
        }

        let customer_ids: Vec<i64> = (0..n)
            .map(|_| rng.gen_range(CUSTOMER_ID_RANGE))
            .collect();

        let products: Vec<&Product> = (0..n)
            .map(|_| &PRODUCTS[rng.gen_range(0..PRODUCTS.len())])
            .collect();

        let quantities: Vec<f64> = (0..n)
            .map(|_| rng.gen_range(QUANTITY_RANGE) as f64)
            .collect();

        let status_dist = WeightedIndex::new(STATUS_WEIGHTS)
            .map_err(|e| anyhow!("invalid status weights: {}", e))?;
        let statuses: Vec<&str> = (0..n)
            .map(|_| DeliveryStatus::ALL[status_dist.sample(&mut rng)].as_str())
            .collect();

        let names: Vec<&str> = products.iter().map(|p| p.name).collect();
        let categories: Vec<&str> = products.iter().map(|p| p.category).collect();
        let prices: Vec<f64> = products.iter().map(|p| p.unit_price).collect();

        let df = DataFrame::new(vec![
            Series::new(columns::ORDER_ID.into(), order_ids).into(),
            date_series(columns::PURCHASE_DATE, &dates)?.into(),
            Series::new(columns::CUSTOMER_ID.into(), customer_ids).into(),
            Series::new(columns::PRODUCT.into(), names).into(),
            Series::new(columns::CATEGORY.into(), categories).into(),
            Series::new(columns::QUANTITY.into(), quantities).into(),
            Series::new(columns::UNIT_PRICE.into(), prices).into(),
            Series::new(columns::DELIVERY_STATUS.into(), statuses).into(),
        ])?;

        debug!("Generated clean fixture: {:?}", df.shape());
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::series_dates;

    fn generator(seed: u64, rows: usize) -> FixtureGenerator {
        FixtureGenerator::new(FixtureConfig {
            seed,
            row_count: rows,
            ..FixtureConfig::default()
        })
    }

    #[test]
    fn test_clean_fixture_shape_and_columns() {
        let df = generator(42, 100).clean_fixture().unwrap();
        assert_eq!(df.shape(), (100, 8));

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, columns::ALL.to_vec());
        assert_eq!(df.column(columns::PURCHASE_DATE).unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn test_clean_fixture_is_deterministic() {
        let a = generator(42, 50).clean_fixture().unwrap();
        let b = generator(42, 50).clean_fixture().unwrap();
        assert!(a.equals(&b));

        let c = generator(43, 50).clean_fixture().unwrap();
        assert!(!a.equals(&c));
    }

    #[test]
    fn test_category_and_price_follow_product() {
        let df = generator(7, 100).clean_fixture().unwrap();
        let products = df.column(columns::PRODUCT).unwrap().str().unwrap();
        let categories = df.column(columns::CATEGORY).unwrap().str().unwrap();
        let prices = df.column(columns::UNIT_PRICE).unwrap().f64().unwrap();

        for i in 0..df.height() {
            let name = products.get(i).unwrap();
            let product = PRODUCTS.iter().find(|p| p.name == name).unwrap();
            assert_eq!(categories.get(i), Some(product.category));
            assert_eq!(prices.get(i), Some(product.unit_price));
        }
    }

    #[test]
    fn test_value_ranges() {
        let config = FixtureConfig::default();
        let df = generator(42, 100).clean_fixture().unwrap();

        let quantities = df.column(columns::QUANTITY).unwrap().f64().unwrap();
        assert!(quantities.into_iter().flatten().all(|q| (1.0..5.0).contains(&q)));

        let customers = df.column(columns::CUSTOMER_ID).unwrap().i64().unwrap();
        assert!(customers.into_iter().flatten().all(|c| CUSTOMER_ID_RANGE.contains(&c)));

        let statuses = df.column(columns::DELIVERY_STATUS).unwrap().str().unwrap();
        assert!(statuses.into_iter().flatten().all(|s| DeliveryStatus::parse(s).is_some()));

        let dates = series_dates(df.column(columns::PURCHASE_DATE).unwrap().as_materialized_series())
            .unwrap();
        for (i, date) in dates.into_iter().enumerate() {
            let date = date.unwrap();
            let latest = config.start_date + Duration::days(i as i64);
            let earliest = latest - Duration::days(config.date_jitter_days as i64 - 1);
            assert!(date <= latest && date >= earliest);
        }
    }

    #[test]
    fn test_order_ids_are_sequential() {
        let df = generator(42, 10).clean_fixture().unwrap();
        let ids: Vec<i64> = df
            .column(columns::ORDER_ID)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(ids, (1001..1011).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_date_jitter_is_an_error() {
        let generator = FixtureGenerator::new(FixtureConfig {
            date_jitter_days: 0,
            ..FixtureConfig::default()
        });

        let err = generator.generate().unwrap_err();
        assert!(err.to_string().contains("date jitter"));
    }
}
