//! One render pass: load → filter → derive → KPIs + aggregates.
//!
//! Every pass recomputes from the cached source table. Nothing below the
//! filter runs when the filter keeps no rows.

use serde::Serialize;
use tracing::info;

use crate::aggregate::Aggregates;
use crate::cache::LoadCache;
use crate::error::DashboardError;
use crate::filter::{self, FilterOptions, FilterRequest};
use crate::kpi::{KpiDisplay, KpiSummary};
use crate::metrics;
use crate::models::{OrderRecord, OrderTable};

/// Rows shown in the raw data preview.
pub const PREVIEW_ROWS: usize = 5;

pub const MISSING_INPUT_MESSAGE: &str = "Please upload the supply chain CSV file to view KPIs and dashboards.";
pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub preview: Vec<OrderRecord>,
    pub options: FilterOptions,
    pub source_rows: usize,
    pub filtered_rows: usize,
    pub kpis: KpiSummary,
    pub kpi_display: KpiDisplay,
    pub aggregates: Aggregates,
}

/// What the presentation sink should show after a render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// Nothing uploaded yet.
    MissingInput { message: String },
    /// Upload loaded but the filters keep zero rows.
    NoData {
        message: String,
        preview: Vec<OrderRecord>,
        options: FilterOptions,
        source_rows: usize,
        filtered_rows: usize,
    },
    Ready(Box<Dashboard>),
}

impl RenderOutcome {
    pub fn filtered_rows(&self) -> usize {
        match self {
            RenderOutcome::MissingInput { .. } => 0,
            RenderOutcome::NoData { filtered_rows, .. } => *filtered_rows,
            RenderOutcome::Ready(dashboard) => dashboard.filtered_rows,
        }
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            RenderOutcome::Ready(dashboard) => Some(&**dashboard),
            _ => None,
        }
    }
}

/// Full pass for an upload (if any). Malformed uploads abort before any
/// filtering or aggregation.
pub fn render(
    upload: Option<&[u8]>,
    cache: &mut LoadCache,
    request: &FilterRequest,
) -> Result<RenderOutcome, DashboardError> {
    let Some(bytes) = upload else {
        info!("No upload yet, skipping render");
        return Ok(RenderOutcome::MissingInput {
            message: MISSING_INPUT_MESSAGE.to_string(),
        });
    };
    let table = cache.get_or_load(bytes)?;
    Ok(render_table(&table, request))
}

fn no_data(preview: Vec<OrderRecord>, options: FilterOptions, source_rows: usize) -> RenderOutcome {
    RenderOutcome::NoData {
        message: NO_DATA_MESSAGE.to_string(),
        preview,
        options,
        source_rows,
        filtered_rows: 0,
    }
}

/// Pass over an already loaded table.
pub fn render_table(table: &OrderTable, request: &FilterRequest) -> RenderOutcome {
    let options = FilterOptions::from_table(table);
    let criteria = request.criteria(&options);
    let filtered = filter::apply(table, &criteria);
    let preview = table.head(PREVIEW_ROWS).to_vec();

    if filtered.is_empty() {
        info!("Filters matched 0 of {} orders", table.len());
        return no_data(preview, options, table.len());
    }

    let derived = metrics::derive(filtered.rows());
    let Some(kpis) = KpiSummary::compute(&derived) else {
        return no_data(preview, options, table.len());
    };
    let aggregates = Aggregates::build(&derived);

    info!("Rendered dashboard for {}/{} orders", filtered.len(), filtered.source_len());
    RenderOutcome::Ready(Box::new(Dashboard {
        preview,
        options,
        source_rows: filtered.source_len(),
        filtered_rows: filtered.len(),
        kpi_display: kpis.display(),
        kpis,
        aggregates,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DateSelection, Selection};

    const CSV: &str = "order_id,order_date,ship_date,delivery_date,units_sold,unit_price,shipping_cost,fulfillment_cost,delivery_status,region,warehouse_id,product_category\n\
                       1,2024-01-01,2024-01-02,2024-01-05,2,10,1,1,Late,US,W1,Electronics\n\
                       2,2024-01-02,2024-01-03,2024-01-04,1,20,2,2,On Time,US,W2,Electronics\n\
                       3,2024-01-03,2024-01-03,2024-01-06,5,5,1,1,On Time,EU,W1,Books\n";

    #[test]
    fn test_missing_input() {
        let mut cache = LoadCache::new();
        let outcome = render(None, &mut cache, &FilterRequest::default()).unwrap();
        assert!(matches!(outcome, RenderOutcome::MissingInput { .. }));
        assert_eq!(cache.misses(), 0);
    }

    #[test]
    fn test_region_us_scenario() {
        let mut cache = LoadCache::new();
        let request = FilterRequest {
            regions: Selection::only(["US"]),
            ..Default::default()
        };
        let outcome = render(Some(CSV.as_bytes()), &mut cache, &request).unwrap();
        let dashboard = outcome.dashboard().unwrap();

        assert_eq!(dashboard.source_rows, 3);
        assert_eq!(dashboard.filtered_rows, 2);
        assert_eq!(dashboard.kpis.total_revenue, 40.0);
        assert_eq!(dashboard.kpis.total_profit, 34.0);
        assert_eq!(dashboard.kpis.on_time_rate, 50.0);
        assert_eq!(dashboard.kpi_display.on_time_rate, "50.0%");
        assert_eq!(dashboard.preview.len(), 3);
    }

    #[test]
    fn test_unobserved_region_is_no_data() {
        let mut cache = LoadCache::new();
        let request = FilterRequest {
            regions: Selection::only(["LATAM"]),
            ..Default::default()
        };
        let outcome = render(Some(CSV.as_bytes()), &mut cache, &request).unwrap();
        match outcome {
            RenderOutcome::NoData { filtered_rows, source_rows, .. } => {
                assert_eq!(filtered_rows, 0);
                assert_eq!(source_rows, 3);
            }
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_upload_aborts() {
        let mut cache = LoadCache::new();
        let err = render(Some(&b"order_id\n1\n"[..]), &mut cache, &FilterRequest::default()).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_rerender_reuses_parse() {
        let mut cache = LoadCache::new();
        let mut request = FilterRequest::default();
        render(Some(CSV.as_bytes()), &mut cache, &request).unwrap();
        request.dates = DateSelection::parse(&["2024-01-02"]);
        let outcome = render(Some(CSV.as_bytes()), &mut cache, &request).unwrap();
        assert_eq!(outcome.filtered_rows(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
    }
}
