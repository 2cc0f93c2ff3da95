use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::OrderRecord;

const SECONDS_PER_DAY: i64 = 86_400;

/// An order with its computed fields. Source columns are borrowed, never copied or changed.
///
/// A money field is `None` when any cell it is computed from is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedOrder<'a> {
    #[serde(flatten)]
    pub order: &'a OrderRecord,
    pub order_value: Option<f64>,
    pub total_cost: Option<f64>,
    pub profit: Option<f64>,
    pub delivery_days: i64,
    pub is_late: bool,
}

/// Whole days between two timestamps, floored (a 36h span is 1 day, -12h is -1).
pub fn whole_days(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

impl<'a> DerivedOrder<'a> {
    pub fn from_order(order: &'a OrderRecord) -> Self {
        let order_value = order.units_sold.zip(order.unit_price).map(|(units, price)| units * price);
        let total_cost = order.shipping_cost.zip(order.fulfillment_cost).map(|(ship, fulfill)| ship + fulfill);
        Self {
            order,
            order_value,
            total_cost,
            profit: order_value.zip(total_cost).map(|(value, cost)| value - cost),
            delivery_days: whole_days(order.ship_date, order.delivery_date),
            is_late: order.delivery_status.is_late(),
        }
    }
}

/// Append the derived fields to every row, keeping row order.
pub fn derive<'a>(orders: &[&'a OrderRecord]) -> Vec<DerivedOrder<'a>> {
    orders.iter().map(|&o| DerivedOrder::from_order(o)).collect()
}
