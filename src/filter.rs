//! Filter engine: conjunctive region / warehouse / category / date predicates.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::models::{parse_timestamp, OrderRecord, OrderTable};

// ============================================================================
// Options offered by the selection controls
// ============================================================================

/// Distinct values observed in the source table, sorted, plus the order-date span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub warehouses: Vec<String>,
    pub categories: Vec<String>,
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

fn sorted_distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

impl FilterOptions {
    pub fn from_table(table: &OrderTable) -> Self {
        let rows = table.rows();
        Self {
            regions: sorted_distinct(rows.iter().map(|r| &r.region)),
            warehouses: sorted_distinct(rows.iter().map(|r| &r.warehouse_id)),
            categories: sorted_distinct(rows.iter().map(|r| &r.product_category)),
            date_span: table.order_date_span(),
        }
    }
}

// ============================================================================
// Raw control state
// ============================================================================

/// State of one multi-select control.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    /// Control untouched: every observed value.
    #[default]
    All,
    /// Explicit choice. An empty set matches nothing.
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    fn resolve(&self, observed: &[String]) -> BTreeSet<String> {
        match self {
            Selection::All => observed.iter().cloned().collect(),
            Selection::Only(set) => set.clone(),
        }
    }
}

/// State of the date control, which may hold zero, one or two dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateSelection {
    #[default]
    Unset,
    Single(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl DateSelection {
    /// Interpret raw control values. More than two values, or any value that
    /// is not a date, collapses to [`DateSelection::Unset`].
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Self {
        let parsed: Option<Vec<NaiveDate>> = values
            .iter()
            .map(|v| parse_timestamp(v.as_ref()).map(|dt| dt.date()))
            .collect();

        match parsed.as_deref() {
            Some([d]) => DateSelection::Single(*d),
            Some([start, end]) => DateSelection::Range(*start, *end),
            _ => DateSelection::Unset,
        }
    }

    /// Inclusive `[start, end]`. Unset falls back to the observed span, or to
    /// the whole calendar when there is nothing observed.
    pub fn normalize(self, span: Option<(NaiveDate, NaiveDate)>) -> (NaiveDate, NaiveDate) {
        match self {
            DateSelection::Single(d) => (d, d),
            DateSelection::Range(a, b) if a <= b => (a, b),
            DateSelection::Range(a, b) => (b, a),
            DateSelection::Unset => span.unwrap_or((NaiveDate::MIN, NaiveDate::MAX)),
        }
    }
}

/// Everything the selection controls currently hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    pub regions: Selection,
    pub warehouses: Selection,
    pub categories: Selection,
    pub dates: DateSelection,
}

impl FilterRequest {
    pub fn criteria(&self, options: &FilterOptions) -> FilterCriteria {
        FilterCriteria::resolve(options, &self.regions, &self.warehouses, &self.categories, self.dates)
    }
}

// ============================================================================
// Resolved criteria
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub regions: BTreeSet<String>,
    pub warehouses: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FilterCriteria {
    /// Everything observed: the default state of the controls.
    pub fn all(options: &FilterOptions) -> Self {
        Self::resolve(
            options,
            &Selection::All,
            &Selection::All,
            &Selection::All,
            DateSelection::Unset,
        )
    }

    pub fn resolve(
        options: &FilterOptions,
        regions: &Selection,
        warehouses: &Selection,
        categories: &Selection,
        dates: DateSelection,
    ) -> Self {
        let (start, end) = dates.normalize(options.date_span);
        Self {
            regions: regions.resolve(&options.regions),
            warehouses: warehouses.resolve(&options.warehouses),
            categories: categories.resolve(&options.categories),
            start,
            end,
        }
    }

    pub fn matches(&self, order: &OrderRecord) -> bool {
        let day = order.order_date.date();
        self.regions.contains(&order.region)
            && self.warehouses.contains(&order.warehouse_id)
            && self.categories.contains(&order.product_category)
            && self.start <= day
            && day <= self.end
    }
}

/// Rows of the source table that passed the filter, in source order.
#[derive(Debug, Clone)]
pub struct FilteredOrders<'a> {
    rows: Vec<&'a OrderRecord>,
    source_len: usize,
}

impl<'a> FilteredOrders<'a> {
    pub fn rows(&self) -> &[&'a OrderRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row count of the table the filter ran over.
    pub fn source_len(&self) -> usize {
        self.source_len
    }
}

pub fn apply<'a>(table: &'a OrderTable, criteria: &FilterCriteria) -> FilteredOrders<'a> {
    let rows: Vec<&OrderRecord> = table.rows().iter().filter(|r| criteria.matches(r)).collect();
    debug!("Filter kept {}/{} orders", rows.len(), table.len());
    FilteredOrders {
        rows,
        source_len: table.len(),
    }
}
