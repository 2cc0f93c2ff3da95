//! Headline KPIs over the filtered, derived orders.

use serde::Serialize;

use crate::metrics::DerivedOrder;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_orders: usize,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub on_time_rate: f64,
    pub avg_delivery_days: f64,
    pub avg_fulfillment_cost: f64,
}

/// KPI values formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiDisplay {
    pub total_orders: String,
    pub total_revenue: String,
    pub total_profit: String,
    pub on_time_rate: String,
    pub avg_delivery_days: String,
    pub avg_fulfillment_cost: String,
}

/// `100 × (1 − share of late orders)`. Callers pass a non-zero `total`.
pub fn on_time_rate(late: usize, total: usize) -> f64 {
    100.0 * (1.0 - late as f64 / total as f64)
}

/// Mean of the present values; NaN when none are present.
pub fn mean_present(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let (sum, count) = values.flatten().fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

impl KpiSummary {
    /// Reduce the rows to the six headline metrics. `None` for no rows, where
    /// the rates and means are undefined. Missing money values are skipped.
    pub fn compute(rows: &[DerivedOrder]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let n = rows.len();
        let late = rows.iter().filter(|r| r.is_late).count();
        let delivery_days: i64 = rows.iter().map(|r| r.delivery_days).sum();

        Some(Self {
            total_orders: n,
            total_revenue: rows.iter().filter_map(|r| r.order_value).sum(),
            total_profit: rows.iter().filter_map(|r| r.profit).sum(),
            on_time_rate: on_time_rate(late, n),
            avg_delivery_days: delivery_days as f64 / n as f64,
            avg_fulfillment_cost: mean_present(rows.iter().map(|r| r.order.fulfillment_cost)),
        })
    }

    pub fn display(&self) -> KpiDisplay {
        KpiDisplay {
            total_orders: group_thousands(&self.total_orders.to_string()),
            total_revenue: format_currency(self.total_revenue, 0),
            total_profit: format_currency(self.total_profit, 0),
            on_time_rate: format!("{:.1}%", self.on_time_rate),
            avg_delivery_days: format!("{:.2}", self.avg_delivery_days),
            avg_fulfillment_cost: format_currency(self.avg_fulfillment_cost, 2),
        }
    }
}

/// `$1,234` / `$-56.70`: dollar sign, grouped thousands, fixed decimals.
pub fn format_currency(value: f64, decimals: usize) -> String {
    format!("${}", group_thousands(&format!("{value:.decimals$}")))
}

/// Insert `,` every three digits of the integer part of a formatted number.
pub fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive;
    use crate::models::{parse_timestamp, DeliveryStatus, OrderRecord};

    fn order(units: u64, price: f64, ship: f64, fulfill: f64, status: &str, days: i64) -> OrderRecord {
        let shipped = parse_timestamp("2024-01-01").unwrap();
        OrderRecord {
            order_id: "x".to_string(),
            order_date: shipped,
            ship_date: shipped,
            delivery_date: shipped + chrono::Duration::days(days),
            units_sold: Some(units as f64),
            unit_price: Some(price),
            shipping_cost: Some(ship),
            fulfillment_cost: Some(fulfill),
            delivery_status: DeliveryStatus::from(status),
            region: "US".to_string(),
            warehouse_id: "W1".to_string(),
            product_category: "Electronics".to_string(),
        }
    }

    #[test]
    fn test_two_order_summary() {
        let a = order(2, 10.0, 1.0, 1.0, "Late", 2);
        let b = order(1, 20.0, 2.0, 2.0, "On Time", 5);
        let rows = derive(&[&a, &b]);
        let kpi = KpiSummary::compute(&rows).unwrap();

        assert_eq!(kpi.total_orders, 2);
        assert_eq!(kpi.total_revenue, 40.0);
        assert_eq!(kpi.total_profit, 34.0);
        assert_eq!(kpi.on_time_rate, 50.0);
        assert_eq!(kpi.avg_delivery_days, 3.5);
        assert_eq!(kpi.avg_fulfillment_cost, 1.5);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let a = order(2, 10.0, 1.0, 1.0, "On Time", 2);
        let mut b = order(1, 20.0, 2.0, 3.0, "On Time", 2);
        b.unit_price = None;
        let mut c = order(1, 5.0, 1.0, 1.0, "Late", 2);
        c.fulfillment_cost = None;

        let kpi = KpiSummary::compute(&derive(&[&a, &b, &c])).unwrap();
        assert_eq!(kpi.total_orders, 3);
        assert_eq!(kpi.total_revenue, 25.0);
        // b has no order value, c has no total cost
        assert_eq!(kpi.total_profit, 18.0);
        assert_eq!(kpi.avg_fulfillment_cost, 2.0);
    }

    #[test]
    fn test_mean_present() {
        assert_eq!(mean_present([Some(1.0), None, Some(3.0)].into_iter()), 2.0);
        assert!(mean_present([None, None].into_iter()).is_nan());
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(KpiSummary::compute(&[]), None);
    }

    #[test]
    fn test_on_time_rate_bounds() {
        let late = order(1, 1.0, 0.0, 0.0, "Late", 1);
        let on_time = order(1, 1.0, 0.0, 0.0, "On Time", 1);
        let all_late = KpiSummary::compute(&derive(&[&late, &late])).unwrap();
        let none_late = KpiSummary::compute(&derive(&[&on_time])).unwrap();
        assert_eq!(all_late.on_time_rate, 0.0);
        assert_eq!(none_late.on_time_rate, 100.0);
    }

    #[test]
    fn test_display_formatting() {
        let kpi = KpiSummary {
            total_orders: 1234567,
            total_revenue: 98765.4,
            total_profit: -1234.2,
            on_time_rate: 87.24,
            avg_delivery_days: 3.14159,
            avg_fulfillment_cost: 4.1,
        };
        let shown = kpi.display();
        assert_eq!(shown.total_orders, "1,234,567");
        assert_eq!(shown.total_revenue, "$98,765");
        assert_eq!(shown.total_profit, "$-1,234");
        assert_eq!(shown.on_time_rate, "87.2%");
        assert_eq!(shown.avg_delivery_days, "3.14");
        assert_eq!(shown.avg_fulfillment_cost, "$4.10");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("-123456.78"), "-123,456.78");
    }
}
