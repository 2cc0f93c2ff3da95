//! Grouped reductions feeding the dashboard charts.
//!
//! Every table comes out sorted ascending by its key. Only observed keys form
//! groups, so no group is ever empty. Missing money values are skipped in sums.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::kpi::on_time_rate;
use crate::metrics::DerivedOrder;

// ============================================================================
// Aggregate rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOrders {
    pub order_date: NaiveDateTime,
    pub orders: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRevenue {
    pub region: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarehouseOnTime {
    pub warehouse_id: String,
    pub on_time_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPerformance {
    pub product_category: String,
    pub revenue: f64,
    pub profit: f64,
    pub avg_delivery_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDelivery {
    pub product_category: String,
    pub avg_delivery_days: f64,
}

/// All grouped tables of one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub by_date: Vec<DailyOrders>,
    pub by_region: Vec<RegionRevenue>,
    pub by_warehouse: Vec<WarehouseOnTime>,
    pub by_category: Vec<CategoryPerformance>,
    pub delivery_by_category: Vec<CategoryDelivery>,
}

/// Partition rows by key, groups sorted by key, rows in input order.
fn group_sorted<'r, 'a, F>(rows: &'r [DerivedOrder<'a>], key: F) -> BTreeMap<&'a str, Vec<&'r DerivedOrder<'a>>>
where
    F: Fn(&DerivedOrder<'a>) -> &'a str,
{
    let mut groups: BTreeMap<&str, Vec<&DerivedOrder>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(row)).or_default().push(row);
    }
    groups
}

pub fn orders_by_date(rows: &[DerivedOrder]) -> Vec<DailyOrders> {
    let mut days: BTreeMap<NaiveDateTime, (usize, f64)> = BTreeMap::new();
    for row in rows {
        let entry = days.entry(row.order.order_date).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += row.order_value.unwrap_or(0.0);
    }
    days.into_iter()
        .map(|(order_date, (orders, revenue))| DailyOrders { order_date, orders, revenue })
        .collect()
}

pub fn revenue_by_region(rows: &[DerivedOrder]) -> Vec<RegionRevenue> {
    group_sorted(rows, |r| r.order.region.as_str())
        .into_iter()
        .map(|(region, group)| RegionRevenue {
            region: region.to_string(),
            revenue: group.iter().filter_map(|r| r.order_value).sum(),
        })
        .collect()
}

pub fn on_time_by_warehouse(rows: &[DerivedOrder]) -> Vec<WarehouseOnTime> {
    group_sorted(rows, |r| r.order.warehouse_id.as_str())
        .into_iter()
        .map(|(warehouse_id, group)| {
            let late = group.iter().filter(|r| r.is_late).count();
            WarehouseOnTime {
                warehouse_id: warehouse_id.to_string(),
                on_time_rate: on_time_rate(late, group.len()),
            }
        })
        .collect()
}

pub fn performance_by_category(rows: &[DerivedOrder]) -> Vec<CategoryPerformance> {
    group_sorted(rows, |r| r.order.product_category.as_str())
        .into_iter()
        .map(|(product_category, group)| {
            let days: i64 = group.iter().map(|r| r.delivery_days).sum();
            CategoryPerformance {
                product_category: product_category.to_string(),
                revenue: group.iter().filter_map(|r| r.order_value).sum(),
                profit: group.iter().filter_map(|r| r.profit).sum(),
                avg_delivery_days: days as f64 / group.len() as f64,
            }
        })
        .collect()
}

impl Aggregates {
    pub fn build(rows: &[DerivedOrder]) -> Self {
        let by_category = performance_by_category(rows);
        let delivery_by_category = by_category
            .iter()
            .map(|c| CategoryDelivery {
                product_category: c.product_category.clone(),
                avg_delivery_days: c.avg_delivery_days,
            })
            .collect();

        Self {
            by_date: orders_by_date(rows),
            by_region: revenue_by_region(rows),
            by_warehouse: on_time_by_warehouse(rows),
            by_category,
            delivery_by_category,
        }
    }

    /// Chart descriptors for a plotting front end, one per dashboard chart.
    pub fn charts(&self) -> serde_json::Result<Vec<ChartSpec>> {
        Ok(vec![
            ChartSpec::new("Orders Over Time", ChartKind::Line, "order_date", &["orders"], &self.by_date)?,
            ChartSpec::new("Revenue Over Time", ChartKind::Line, "order_date", &["revenue"], &self.by_date)?,
            ChartSpec::new("Revenue by Region", ChartKind::Bar, "region", &["revenue"], &self.by_region)?,
            ChartSpec::new(
                "On-Time Delivery Rate by Warehouse",
                ChartKind::Bar,
                "warehouse_id",
                &["on_time_rate"],
                &self.by_warehouse,
            )?,
            ChartSpec::new(
                "Revenue vs Profit by Product Category",
                ChartKind::GroupedBar,
                "product_category",
                &["revenue", "profit"],
                &self.by_category,
            )?,
            ChartSpec::new(
                "Average Delivery Time by Product Category (days)",
                ChartKind::Bar,
                "product_category",
                &["avg_delivery_days"],
                &self.delivery_by_category,
            )?,
        ])
    }
}

// ============================================================================
// Chart descriptors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    GroupedBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: &'static str,
    pub kind: ChartKind,
    pub x: &'static str,
    pub y: Vec<&'static str>,
    pub data: serde_json::Value,
}

impl ChartSpec {
    fn new<T: Serialize>(
        title: &'static str,
        kind: ChartKind,
        x: &'static str,
        y: &[&'static str],
        rows: &[T],
    ) -> serde_json::Result<Self> {
        Ok(Self {
            title,
            kind,
            x,
            y: y.to_vec(),
            data: serde_json::to_value(rows)?,
        })
    }
}
