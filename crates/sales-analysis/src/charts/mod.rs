//! SVG chart rendering with plotters.
//!
//! Charts never touch the table; they draw from the aggregated results.
//! Empty inputs produce a titled, empty frame.

mod pie;

use crate::aggregation::{DailyTotal, GroupTotal, SalesSummary};
use anyhow::Result;
use chrono::Duration;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CATEGORY_REVENUE_FILE: &str = "category_revenue.svg";
pub const PRODUCT_QUANTITY_FILE: &str = "product_quantity.svg";
pub const DAILY_REVENUE_FILE: &str = "daily_revenue.svg";
pub const DELIVERY_STATUS_FILE: &str = "delivery_status.svg";
pub const BOXPLOT_BEFORE_FILE: &str = "quantity_boxplot_before.svg";
pub const BOXPLOT_AFTER_FILE: &str = "quantity_boxplot_after.svg";

const CHART_SIZE: (u32, u32) = (800, 500);
const CAPTION_FONT: (&str, u32) = ("sans-serif", 24);
const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);
const LINE_COLOR: RGBColor = RGBColor(46, 139, 87);

/// Writes the sales charts into one directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render every chart and return the written paths.
    ///
    /// `quantities_before` and `quantities_after` are the quantity values
    /// on either side of outlier trimming.
    pub fn render_all(
        &self,
        summary: &SalesSummary,
        quantities_before: &[f64],
        quantities_after: &[f64],
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;
        info!("Rendering charts into {}", self.output_dir.display());

        let paths = vec![
            self.category_revenue(&summary.revenue_by_category)?,
            self.product_quantity(&summary.quantity_by_product)?,
            self.daily_revenue(&summary.revenue_by_day)?,
            self.delivery_status(&summary.status_distribution)?,
            self.quantity_boxplot(
                BOXPLOT_BEFORE_FILE,
                "Quantity before outlier trimming",
                quantities_before,
            )?,
            self.quantity_boxplot(
                BOXPLOT_AFTER_FILE,
                "Quantity after outlier trimming",
                quantities_after,
            )?,
        ];
        Ok(paths)
    }

    /// Vertical bars of revenue per category.
    pub fn category_revenue(&self, totals: &[GroupTotal]) -> Result<PathBuf> {
        let path = self.output_dir.join(CATEGORY_REVENUE_FILE);
        let title = "Revenue by category";
        if totals.is_empty() {
            return empty_chart(path, title);
        }

        {
            let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)?;

            let labels: Vec<&str> = totals.iter().map(|t| t.key.as_str()).collect();
            let mut chart = ChartBuilder::on(&root)
                .caption(title, CAPTION_FONT)
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(80)
                .build_cartesian_2d((0..totals.len()).into_segmented(), 0f64..axis_max(totals))?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc("Category")
                .y_desc("Revenue")
                .x_label_formatter(&|v| segment_label(v, &labels))
                .draw()?;

            chart.draw_series(
                Histogram::vertical(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(20)
                    .data(totals.iter().enumerate().map(|(i, t)| (i, t.value))),
            )?;
            root.present()?;
        }

        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Horizontal bars of units per product, largest on top.
    pub fn product_quantity(&self, totals: &[GroupTotal]) -> Result<PathBuf> {
        let path = self.output_dir.join(PRODUCT_QUANTITY_FILE);
        let title = "Units sold by product";
        if totals.is_empty() {
            return empty_chart(path, title);
        }

        {
            let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)?;

            // Row 0 is drawn at the bottom, so the list is flipped.
            let n = totals.len();
            let labels: Vec<&str> = totals.iter().rev().map(|t| t.key.as_str()).collect();
            let mut chart = ChartBuilder::on(&root)
                .caption(title, CAPTION_FONT)
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(160)
                .build_cartesian_2d(0f64..axis_max(totals), (0..n).into_segmented())?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .x_desc("Units")
                .y_label_formatter(&|v| segment_label(v, &labels))
                .draw()?;

            chart.draw_series(
                Histogram::horizontal(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(10)
                    .data(totals.iter().enumerate().map(|(i, t)| (n - 1 - i, t.value))),
            )?;
            root.present()?;
        }

        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Line with point markers of revenue per day.
    pub fn daily_revenue(&self, totals: &[DailyTotal]) -> Result<PathBuf> {
        let path = self.output_dir.join(DAILY_REVENUE_FILE);
        let title = "Daily revenue";
        let Some(first) = totals.first().map(|t| t.date) else {
            return empty_chart(path, title);
        };

        {
            let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)?;

            let points: Vec<(i64, f64)> = totals
                .iter()
                .map(|t| ((t.date - first).num_days(), t.value))
                .collect();
            let last_day = points.last().map(|(d, _)| *d).unwrap_or(0).max(1);
            let y_max = totals.iter().map(|t| t.value).fold(0.0, f64::max);

            let mut chart = ChartBuilder::on(&root)
                .caption(title, CAPTION_FONT)
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(80)
                .build_cartesian_2d(0i64..last_day, 0f64..padded(y_max))?;

            chart
                .configure_mesh()
                .x_desc("Date")
                .y_desc("Revenue")
                .x_label_formatter(&|d| (first + Duration::days(*d)).format("%m-%d").to_string())
                .draw()?;

            chart.draw_series(LineSeries::new(points.clone(), LINE_COLOR.stroke_width(2)))?;
            chart.draw_series(
                points
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 3, LINE_COLOR.filled())),
            )?;
            root.present()?;
        }

        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Pie of orders per delivery status, largest slice pulled out.
    pub fn delivery_status(&self, totals: &[GroupTotal]) -> Result<PathBuf> {
        let path = self.output_dir.join(DELIVERY_STATUS_FILE);
        let title = "Delivery status";
        if totals.iter().all(|t| t.value <= 0.0) {
            return empty_chart(path, title);
        }

        pie::draw_pie(&path, title, totals)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Single vertical boxplot of quantity values.
    pub fn quantity_boxplot(&self, file_name: &str, title: &str, values: &[f64]) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        if values.is_empty() {
            return empty_chart(path, title);
        }

        {
            let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)?;

            let quartiles = Quartiles::new(values);
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let pad = ((hi - lo) * 0.1).max(1.0);

            let mut chart = ChartBuilder::on(&root)
                .caption(title, CAPTION_FONT)
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(
                    (0..1usize).into_segmented(),
                    (lo - pad) as f32..(hi + pad) as f32,
                )?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .y_desc("Quantity")
                .x_label_formatter(&|v| segment_label(v, &["quantity"]))
                .draw()?;

            chart.draw_series(std::iter::once(
                Boxplot::new_vertical(SegmentValue::CenterOf(0usize), &quartiles)
                    .width(60)
                    .style(BAR_COLOR),
            ))?;
            root.present()?;
        }

        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Upper bound of the value axis for bar charts.
fn axis_max(totals: &[GroupTotal]) -> f64 {
    padded(totals.iter().map(|t| t.value).fold(0.0, f64::max))
}

fn padded(max: f64) -> f64 {
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

fn segment_label(value: &SegmentValue<usize>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    }
}

/// White canvas with the chart title only.
fn empty_chart(path: PathBuf, title: &str) -> Result<PathBuf> {
    {
        let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        root.titled(title, CAPTION_FONT)?;
        root.present()?;
    }
    debug!("Wrote empty chart {}", path.display());
    Ok(path)
}
