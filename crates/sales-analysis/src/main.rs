//! CLI entry point for the sales analysis pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use polars::prelude::DataFrame;
use sales_analysis::aggregation::{DailyTotal, daily_totals_frame, group_totals_frame};
use sales_analysis::{
    DatasetInspection, Pipeline, PipelineConfig, PipelineResult, ReportGenerator, config,
};
use tracing::{error, info};

const DAILY_PREVIEW_DAYS: usize = 5;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Synthetic retail sales analysis",
    long_about = "Generates a synthetic sales table with planted defects, cleans it and \
                  reports revenue analytics with SVG charts.\n\n\
                  EXAMPLES:\n  \
                  # Default run, charts in ./outputs\n  \
                  sales-analysis\n\n  \
                  # Different seed, no charts, JSON report on stdout\n  \
                  sales-analysis --seed 7 --no-charts --json\n\n  \
                  # Write sales_report.json and cleaned_sales.csv\n  \
                  sales-analysis -o results/ --emit-report"
)]
struct Args {
    /// Output directory for charts, report and cleaned CSV
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Seed of the synthetic data generator
    #[arg(long, default_value_t = config::DEFAULT_SEED)]
    seed: u64,

    /// Number of generated orders (before duplicates are appended)
    #[arg(long, default_value_t = config::DEFAULT_ROW_COUNT)]
    rows: usize,

    /// Quantities at or above mean + sigma * std are trimmed
    #[arg(long, default_value_t = config::DEFAULT_OUTLIER_SIGMA)]
    outlier_sigma: f64,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Output JSON to stdout instead of the console report
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write sales_report.json and cleaned_sales.csv to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = PipelineConfig::builder()
        .seed(args.seed)
        .row_count(args.rows)
        .outlier_sigma(args.outlier_sigma)
        .output_dir(&args.output)
        .render_charts(!args.no_charts)
        .save_to_disk(args.emit_report)
        .build()?;

    let pipeline = Pipeline::builder().config(config.clone()).build()?;

    info!("{}", "=".repeat(80));
    info!("Starting sales analysis pipeline...");
    info!("{}", "=".repeat(80));

    let result = match pipeline.run() {
        Ok(result) => result,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    if args.json {
        let report = ReportGenerator::build_report(&result, &config);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_console_report(&result)?;
    for path in &result.written_files {
        info!("Written: {}", path.display());
    }
    Ok(())
}

/// Print the human-readable report.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn print_console_report(result: &PipelineResult) -> Result<()> {
    print_section("RAW DATA INSPECTION");
    print_inspection(&result.raw_inspection);

    print_section("CLEANING");
    let cleaning = &result.cleaning;
    for (column, failures) in &cleaning.coercion_failures {
        println!("  {:<24} {} values could not be parsed", column, failures);
    }
    if let Some(median) = cleaning.quantity_median {
        println!(
            "  {:<24} {} filled with median {}",
            "quantity", cleaning.quantities_imputed, median
        );
    }
    if let Some(mode) = &cleaning.status_mode {
        println!(
            "  {:<24} {} filled with mode '{}'",
            "delivery_status", cleaning.statuses_imputed, mode
        );
    }
    println!("  Unrecoverable rows removed: {}", cleaning.unrecoverable_rows_removed);
    println!("  Duplicate rows removed:     {}", cleaning.duplicates_removed);
    match cleaning.outlier_threshold {
        Some(threshold) => println!(
            "  Outliers removed:           {} (quantity >= {:.3})",
            cleaning.outliers_removed, threshold
        ),
        None => println!("  Outliers removed:           0 (too few values)"),
    }
    println!(
        "  Rows: {} -> {} ({:.1}% removed)",
        cleaning.rows_before,
        cleaning.rows_after,
        cleaning.rows_removed_percentage()
    );

    print_section("CLEANED DATA INSPECTION");
    print_inspection(&result.cleaned_inspection);

    let sales = &result.sales;
    print_section("SALES");
    println!("  Orders:         {}", sales.order_count);
    println!("  Units sold:     {}", sales.total_quantity);
    println!("  Total revenue:  {:.2}", sales.total_revenue);
    println!();
    println!("Revenue by category:");
    println!("{}", group_totals_frame("category", "revenue", &sales.revenue_by_category)?);
    println!("Units by product:");
    println!("{}", group_totals_frame("product", "quantity", &sales.quantity_by_product)?);
    println!("Daily revenue (first {} days):", DAILY_PREVIEW_DAYS);
    println!("{}", daily_revenue_preview(&sales.revenue_by_day)?);
    println!("Delivery status:");
    println!("{}", group_totals_frame("delivery_status", "orders", &sales.status_distribution)?);

    if !result.charts.is_empty() {
        print_section("CHARTS");
        for path in &result.charts {
            println!("  {}", path.display());
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("Finished in {} ms", result.duration_ms);
    Ok(())
}

/// Leading days of the dense daily series shown on the console.
fn daily_revenue_preview(totals: &[DailyTotal]) -> Result<DataFrame> {
    Ok(daily_totals_frame("revenue", totals)?.head(Some(DAILY_PREVIEW_DAYS)))
}

fn print_section(title: &str) {
    println!("\n{}", "=".repeat(80));
    println!("{}", title);
    println!("{}\n", "=".repeat(80));
}

fn print_inspection(inspection: &DatasetInspection) {
    let (rows, cols) = inspection.shape;
    println!("Shape: {} rows x {} columns", rows, cols);
    println!("Duplicate rows: {}", inspection.duplicate_count);
    println!();

    println!("{:<20} {:<12} {:<10} {:<10}", "Column", "Type", "Nulls", "Null %");
    println!("{}", "-".repeat(56));
    for col in &inspection.columns {
        println!(
            "{:<20} {:<12} {:<10} {:<10.1}",
            col.name, col.dtype, col.null_count, col.null_percentage
        );
    }
    println!();

    println!("First rows:\n{}", inspection.head);
    println!("Last rows:\n{}", inspection.tail);

    if !inspection.numeric.is_empty() {
        println!("NUMERIC SUMMARY");
        println!("{}", "-".repeat(40));
        println!(
            "{:<14} {:>6} {:>10} {:>10} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for s in &inspection.numeric {
            println!(
                "{:<14} {:>6} {:>10} {:>10} {:>9} {:>9} {:>9} {:>9} {:>9}",
                s.column,
                s.count,
                fmt_stat(s.mean),
                fmt_stat(s.std),
                fmt_stat(s.min),
                fmt_stat(s.q25),
                fmt_stat(s.median),
                fmt_stat(s.q75),
                fmt_stat(s.max)
            );
        }
        println!();
    }

    if !inspection.categorical.is_empty() {
        println!("CATEGORICAL SUMMARY");
        println!("{}", "-".repeat(40));
        println!("{:<16} {:>6} {:>7} {:<16} {:>5}", "Column", "count", "unique", "top", "freq");
        for s in &inspection.categorical {
            println!(
                "{:<16} {:>6} {:>7} {:<16} {:>5}",
                s.column,
                s.count,
                s.unique,
                s.top.as_deref().unwrap_or("-"),
                s.freq
            );
        }
        println!();
    }
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "NaN".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_daily_preview_shows_first_five_days() {
        let start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let totals: Vec<DailyTotal> = (0..30)
            .map(|i| DailyTotal {
                date: start + chrono::Duration::days(i),
                value: i as f64,
            })
            .collect();

        let preview = daily_revenue_preview(&totals).unwrap();

        assert_eq!(preview.height(), 5);
        let revenue: Vec<f64> = preview.column("revenue").unwrap().f64().unwrap().into_iter().flatten().collect();
        assert_eq!(revenue, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }
}
