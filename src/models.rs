use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Columns an upload must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "order_id",
    "order_date",
    "ship_date",
    "delivery_date",
    "units_sold",
    "unit_price",
    "shipping_cost",
    "fulfillment_cost",
    "delivery_status",
    "region",
    "warehouse_id",
    "product_category",
];

/// Raw record from CSV upload
///
/// Numeric cells that are blank or not a number come through as `None`; they
/// are missing values, not a load failure.
#[derive(Debug, Deserialize)]
pub struct CsvRecord {
    pub order_id: String,
    pub order_date: String,
    pub ship_date: String,
    pub delivery_date: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub units_sold: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub unit_price: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub shipping_cost: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub fulfillment_cost: Option<f64>,
    pub delivery_status: String,
    pub region: String,
    pub warehouse_id: String,
    pub product_category: String,
}

/// Delivery status as reported by the upload.
///
/// Only `Late` drives any metric; every other value is kept verbatim so the
/// preview shows what was uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeliveryStatus {
    OnTime,
    Late,
    Other(String),
}

impl From<&str> for DeliveryStatus {
    fn from(s: &str) -> Self {
        match s {
            "On Time" => DeliveryStatus::OnTime,
            "Late" => DeliveryStatus::Late,
            other => DeliveryStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for DeliveryStatus {
    fn from(s: String) -> Self {
        DeliveryStatus::from(s.as_str())
    }
}

impl From<DeliveryStatus> for String {
    fn from(status: DeliveryStatus) -> Self {
        status.as_str().to_string()
    }
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryStatus::OnTime => "On Time",
            DeliveryStatus::Late => "Late",
            DeliveryStatus::Other(s) => s,
        }
    }

    pub fn is_late(&self) -> bool {
        matches!(self, DeliveryStatus::Late)
    }
}

/// One order row with its timestamps parsed. `None` marks a missing numeric cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub order_date: NaiveDateTime,
    pub ship_date: NaiveDateTime,
    pub delivery_date: NaiveDateTime,
    pub units_sold: Option<f64>,
    pub unit_price: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub fulfillment_cost: Option<f64>,
    pub delivery_status: DeliveryStatus,
    pub region: String,
    pub warehouse_id: String,
    pub product_category: String,
}

/// The immutable source table of one upload, rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderTable {
    rows: Vec<OrderRecord>,
}

impl OrderTable {
    pub fn new(rows: Vec<OrderRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[OrderRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows, for the raw data preview.
    pub fn head(&self, n: usize) -> &[OrderRecord] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Earliest and latest order date (calendar days). `None` for an empty table.
    pub fn order_date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().map(|r| r.order_date.date());
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a timestamp cell. Date-only values land on midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
}

impl CsvRecord {
    /// Convert into an [`OrderRecord`]. `row` is the 1-based data row, used in errors.
    pub fn to_order(&self, row: usize) -> Result<OrderRecord, DashboardError> {
        let date = |column: &str, value: &str| {
            parse_timestamp(value).ok_or_else(|| DashboardError::unparsable_date(row, column, value))
        };

        Ok(OrderRecord {
            order_id: self.order_id.clone(),
            order_date: date("order_date", &self.order_date)?,
            ship_date: date("ship_date", &self.ship_date)?,
            delivery_date: date("delivery_date", &self.delivery_date)?,
            units_sold: self.units_sold,
            unit_price: self.unit_price,
            shipping_cost: self.shipping_cost,
            fulfillment_cost: self.fulfillment_cost,
            delivery_status: DeliveryStatus::from(self.delivery_status.as_str()),
            region: self.region.clone(),
            warehouse_id: self.warehouse_id.clone(),
            product_category: self.product_category.clone(),
        })
    }
}
