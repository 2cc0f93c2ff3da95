//! Synthetic order dataset generator
//!
//! Writes a CSV in the upload schema with randomized but plausible orders:
//! weighted regions and categories, per-warehouse delivery speed and late rate.
//!
//! Usage:
//!   cargo run --release --bin generate_orders -- [OPTIONS]
//!
//! Options:
//!   --rows <N>          Number of orders (default: 5000)
//!   --start-date <D>    First order date (default: 2024-01-01)
//!   --days <N>          Span of order dates in days (default: 180)
//!   --late-rate <F>     Baseline probability an order is late (default: 0.12)
//!   --seed <N>          Random seed for reproducibility (optional)
//!   --output <PATH>     Output CSV path (default: data/orders.csv)

use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

/// Synthetic data generator for order fulfillment dataset
#[derive(Parser, Debug)]
#[command(name = "generate_orders")]
#[command(about = "Generate a synthetic order fulfillment CSV")]
struct Args {
    /// Number of orders to generate
    #[arg(long, default_value = "5000")]
    rows: usize,

    /// First order date (YYYY-MM-DD)
    #[arg(long, default_value = "2024-01-01")]
    start_date: NaiveDate,

    /// Span of order dates in days
    #[arg(long, default_value = "180")]
    days: i64,

    /// Baseline probability an order is delivered late (0.0 - 1.0)
    #[arg(long, default_value = "0.12")]
    late_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "data/orders.csv")]
    output: PathBuf,
}

/// Output row, same columns the dashboard loads
#[derive(Debug, Serialize)]
struct OrderRow {
    order_id: String,
    order_date: String,
    ship_date: String,
    delivery_date: String,
    units_sold: u32,
    unit_price: f64,
    shipping_cost: f64,
    fulfillment_cost: f64,
    delivery_status: &'static str,
    region: &'static str,
    warehouse_id: &'static str,
    product_category: &'static str,
}

/// (region, weight, warehouses serving it)
const REGIONS: [(&str, u32, &[&str]); 4] = [
    ("North America", 40, &["WH-NA-01", "WH-NA-02"]),
    ("Europe", 30, &["WH-EU-01", "WH-EU-02"]),
    ("Asia Pacific", 20, &["WH-AP-01"]),
    ("Latin America", 10, &["WH-LA-01"]),
];

/// (category, weight, unit price range)
const CATEGORIES: [(&str, u32, (f64, f64)); 6] = [
    ("Electronics", 20, (40.0, 900.0)),
    ("Books", 20, (5.0, 40.0)),
    ("Home & Kitchen", 18, (10.0, 250.0)),
    ("Clothing", 17, (8.0, 120.0)),
    ("Toys", 15, (6.0, 80.0)),
    ("Beauty", 10, (4.0, 60.0)),
];

fn pick_weighted<'a, T>(items: &'a [T], weight: impl Fn(&T) -> u32, rng: &mut impl Rng) -> &'a T {
    let total: u32 = items.iter().map(&weight).sum();
    let mut roll = rng.gen_range(0..total);
    for item in items {
        let w = weight(item);
        if roll < w {
            return item;
        }
        roll -= w;
    }
    &items[items.len() - 1]
}

/// Per-warehouse transit profile: slower hubs run later.
fn warehouse_profile(warehouse: &str) -> (i64, f64) {
    match warehouse {
        "WH-NA-01" => (2, 0.8),
        "WH-NA-02" => (3, 1.0),
        "WH-EU-01" => (2, 0.9),
        "WH-EU-02" => (4, 1.3),
        "WH-AP-01" => (5, 1.5),
        _ => (6, 1.8),
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn generate_order(i: usize, args: &Args, rng: &mut impl Rng) -> OrderRow {
    let &(region, _, warehouses) = pick_weighted(&REGIONS, |r| r.1, rng);
    let warehouse = warehouses[rng.gen_range(0..warehouses.len())];
    let &(category, _, (lo, hi)) = pick_weighted(&CATEGORIES, |c| c.1, rng);

    let order_date = args.start_date.and_hms_opt(0, 0, 0).unwrap_or_default()
        + Duration::days(rng.gen_range(0..args.days.max(1)))
        + Duration::minutes(rng.gen_range(0..24 * 60));
    let ship_date = order_date + Duration::hours(rng.gen_range(2..48));

    let (base_days, late_factor) = warehouse_profile(warehouse);
    let is_late = rng.gen::<f64>() < (args.late_rate * late_factor).min(1.0);
    let transit_days = if is_late {
        base_days + rng.gen_range(2..6)
    } else {
        base_days + rng.gen_range(-1..2)
    };
    let delivery_date = ship_date + Duration::days(transit_days.max(1)) + Duration::hours(rng.gen_range(0..10));

    let units_sold = rng.gen_range(1..=6);
    let unit_price = round_cents(rng.gen_range(lo..hi));
    let shipping_cost = round_cents(2.5 + units_sold as f64 * rng.gen_range(0.5..3.0));
    let fulfillment_cost = round_cents(1.5 + units_sold as f64 * rng.gen_range(0.3..1.5));

    OrderRow {
        order_id: format!("ORD-{:07}", i + 1),
        order_date: format_datetime(&order_date),
        ship_date: format_datetime(&ship_date),
        delivery_date: format_datetime(&delivery_date),
        units_sold,
        unit_price,
        shipping_cost,
        fulfillment_cost,
        delivery_status: if is_late { "Late" } else { "On Time" },
        region,
        warehouse_id: warehouse,
        product_category: category,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    println!("Synthetic Order Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Output:           {}", args.output.display());
    println!("Orders:           {}", args.rows);
    println!("Date range:       {} + {} days", args.start_date, args.days);
    println!("Late rate:        {:.1}%", args.late_rate * 100.0);
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&args.output)?;

    let mut late = 0;
    for i in 0..args.rows {
        let row = generate_order(i, &args, &mut rng);
        if row.delivery_status == "Late" {
            late += 1;
        }
        writer.serialize(&row)?;

        if (i + 1) % 10000 == 0 {
            println!("   Generated {}/{} orders...", i + 1, args.rows);
        }
    }
    writer.flush()?;

    println!("Generation complete!");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Orders written:    {:>8}", args.rows);
    println!("Late orders:       {:>8}", late);
    println!("Output file:       {}", args.output.display());

    Ok(())
}
