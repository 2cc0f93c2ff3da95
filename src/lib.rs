//! Order fulfillment dashboard core.
//!
//! Pipeline: load CSV → filter → derive per-order metrics → KPIs and grouped
//! aggregates → hand off to a presentation sink (text report or REST API).

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod metrics;
pub mod models;

pub use dashboard::{render, Dashboard, RenderOutcome};
pub use error::DashboardError;
pub use filter::{DateSelection, FilterCriteria, FilterOptions, FilterRequest, Selection};
pub use models::{OrderRecord, OrderTable};
