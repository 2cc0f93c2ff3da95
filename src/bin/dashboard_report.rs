//! Fulfillment Dashboard Report
//! Renders KPIs and chart tables for an orders CSV in the terminal.
//!
//! Run: ./target/release/dashboard_report --input data/orders.csv \
//!        [--region US,EU] [--warehouse WH-01] [--category Books] \
//!        [--dates 2024-01-01,2024-03-31] [--json]

use anyhow::{Context, Result};
use clap::Parser;
use fulfillment_dashboard::{
    cache::LoadCache,
    dashboard::{render, Dashboard, RenderOutcome},
    kpi::{format_currency, group_thousands},
    DateSelection, FilterRequest, OrderRecord, Selection,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dashboard_report")]
#[command(about = "Order fulfillment KPIs and charts as a terminal report")]
struct Args {
    /// Orders CSV to load
    #[arg(long)]
    input: Option<PathBuf>,

    /// Regions to keep (default: all observed)
    #[arg(long, value_delimiter = ',')]
    region: Option<Vec<String>>,

    /// Warehouses to keep (default: all observed)
    #[arg(long, value_delimiter = ',')]
    warehouse: Option<Vec<String>>,

    /// Product categories to keep (default: all observed)
    #[arg(long, value_delimiter = ',')]
    category: Option<Vec<String>>,

    /// One date, or a start and end date (default: full observed span)
    #[arg(long, value_delimiter = ',')]
    dates: Vec<String>,

    /// Print the render outcome as JSON
    #[arg(long)]
    json: bool,
}

fn selection(values: Option<Vec<String>>) -> Selection {
    match values {
        None => Selection::All,
        Some(values) => Selection::only(values),
    }
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(70));
}

fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    "#".repeat(((value / max) * width as f64).round() as usize)
}

/// Blank for a missing cell.
fn cell(value: Option<f64>, decimals: usize) -> String {
    value.map(|v| format!("{v:.decimals$}")).unwrap_or_default()
}

fn print_preview(rows: &[OrderRecord]) {
    print_subsection("Raw Data Preview");
    println!("  {:10} {:12} {:>6} {:>9} {:10} {:12} {:10} {:15}",
             "Order", "Order Date", "Units", "Price", "Status", "Region", "Warehouse", "Category");
    for r in rows {
        println!("  {:10} {:12} {:>6} {:>9} {:10} {:12} {:10} {:15}",
                 r.order_id, r.order_date.format("%Y-%m-%d").to_string(),
                 cell(r.units_sold, 0), cell(r.unit_price, 2),
                 r.delivery_status.as_str(), r.region, r.warehouse_id, r.product_category);
    }
}

fn print_dashboard(d: &Dashboard) {
    print_section_header("KEY PERFORMANCE INDICATORS");
    let k = &d.kpi_display;
    println!("  Total Orders:                  {:>14}", k.total_orders);
    println!("  Total Revenue:                 {:>14}", k.total_revenue);
    println!("  Total Profit:                  {:>14}", k.total_profit);
    println!("  On-Time Delivery Rate:         {:>14}", k.on_time_rate);
    println!("  Avg Delivery Time (days):      {:>14}", k.avg_delivery_days);
    println!("  Avg Fulfillment Cost / Order:  {:>14}", k.avg_fulfillment_cost);

    let agg = &d.aggregates;

    print_section_header("TIME SERIES & PERFORMANCE");
    print_subsection("Orders & Revenue Over Time");
    let max_rev = agg.by_date.iter().map(|r| r.revenue).fold(0.0, f64::max);
    println!("  {:20} {:>8} {:>14} {}", "Order Date", "Orders", "Revenue", "Trend");
    for r in &agg.by_date {
        println!("  {:20} {:>8} {:>14} {}",
                 r.order_date.format("%Y-%m-%d %H:%M").to_string(), r.orders,
                 format_currency(r.revenue, 0), bar(r.revenue, max_rev, 30));
    }

    print_section_header("REGIONAL & WAREHOUSE INSIGHTS");
    print_subsection("Revenue by Region");
    let max_region = agg.by_region.iter().map(|r| r.revenue).fold(0.0, f64::max);
    for r in &agg.by_region {
        println!("  {:20} {:>14} {}", r.region, format_currency(r.revenue, 0), bar(r.revenue, max_region, 40));
    }

    print_subsection("On-Time Delivery Rate by Warehouse");
    for w in &agg.by_warehouse {
        println!("  {:20} {:>7.1}% {}", w.warehouse_id, w.on_time_rate, bar(w.on_time_rate, 100.0, 40));
    }

    print_section_header("PRODUCT CATEGORY PERFORMANCE");
    print_subsection("Revenue vs Profit by Product Category");
    println!("  {:20} {:>14} {:>14}", "Category", "Revenue", "Profit");
    for c in &agg.by_category {
        println!("  {:20} {:>14} {:>14}", c.product_category,
                 format_currency(c.revenue, 0), format_currency(c.profit, 0));
    }

    print_subsection("Average Delivery Time by Product Category (days)");
    let max_days = agg.delivery_by_category.iter().map(|c| c.avg_delivery_days).fold(0.0, f64::max);
    for c in &agg.delivery_by_category {
        println!("  {:20} {:>8.2} {}", c.product_category, c.avg_delivery_days,
                 bar(c.avg_delivery_days, max_days, 40));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
        .init();

    let args = Args::parse();

    let upload = match &args.input {
        Some(path) => Some(
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        ),
        None => None,
    };

    let request = FilterRequest {
        regions: selection(args.region),
        warehouses: selection(args.warehouse),
        categories: selection(args.category),
        dates: DateSelection::parse(args.dates.as_slice()),
    };

    let mut cache = LoadCache::new();
    let outcome = render(upload.as_deref(), &mut cache, &request)
        .context("loading orders CSV")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("\n{}", "█".repeat(80));
    println!("{}  ORDER FULFILLMENT DASHBOARD  {}", "█".repeat(24), "█".repeat(25));
    println!("{}", "█".repeat(80));

    match &outcome {
        RenderOutcome::MissingInput { message } => {
            println!("\n  {}", message);
            println!("  Pass --input <PATH> to load a CSV.");
        }
        RenderOutcome::NoData { message, preview, filtered_rows, .. } => {
            print_preview(preview);
            println!("\n  Filtered rows: {}", group_thousands(&filtered_rows.to_string()));
            println!("  {}", message);
        }
        RenderOutcome::Ready(dashboard) => {
            print_preview(&dashboard.preview);
            println!("\n  Filtered rows: {}", group_thousands(&dashboard.filtered_rows.to_string()));
            print_dashboard(dashboard);
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}
