//! REST API handlers for the fulfillment dashboard
//!
//! These handlers use the shared DashboardService.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::{DashboardService, UploadSummary};
use crate::aggregate::ChartSpec;
use crate::dashboard::RenderOutcome;
use crate::error::DashboardError;
use crate::filter::{DateSelection, FilterOptions, FilterRequest, Selection};
use crate::models::OrderRecord;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct UploadResponse {
    pub rows: usize,
    pub preview: Vec<OrderRecord>,
    pub options: FilterOptions,
}

impl From<UploadSummary> for UploadResponse {
    fn from(s: UploadSummary) -> Self {
        Self {
            rows: s.rows,
            preview: s.preview,
            options: s.options,
        }
    }
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub outcome: RenderOutcome,
    pub charts: Vec<ChartSpec>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: DashboardError) -> ApiError {
    let status = match e {
        DashboardError::MalformedInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::MissingInput => StatusCode::NOT_FOUND,
        DashboardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Comma-separated control values. An absent parameter means "all observed";
/// a present but empty one selects nothing.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub regions: Option<String>,
    pub warehouses: Option<String>,
    pub categories: Option<String>,
    pub dates: Option<String>,
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn selection(raw: &Option<String>) -> Selection {
    match raw {
        None => Selection::All,
        Some(list) => Selection::only(split_list(list)),
    }
}

impl DashboardQuery {
    pub fn to_request(&self) -> FilterRequest {
        let dates = match &self.dates {
            None => DateSelection::Unset,
            Some(list) => DateSelection::parse(&split_list(list).collect::<Vec<_>>()),
        };
        FilterRequest {
            regions: selection(&self.regions),
            warehouses: selection(&self.warehouses),
            categories: selection(&self.categories),
            dates,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// POST /api/v1/upload
pub async fn upload(
    State(service): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    match service.upload(body).await {
        Ok(summary) => Ok(Json(UploadResponse::from(summary))),
        Err(e) => Err(api_error(e)),
    }
}

/// GET /api/v1/options
pub async fn get_options(
    State(service): State<AppState>,
) -> Result<Json<FilterOptions>, ApiError> {
    service.options().await.map(Json).map_err(api_error)
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(service): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let outcome = service.render(&params.to_request()).await.map_err(api_error)?;
    let charts = match outcome.dashboard() {
        Some(dashboard) => dashboard.aggregates.charts().map_err(|e| {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() }))
        })?,
        None => Vec::new(),
    };
    Ok(Json(DashboardResponse { outcome, charts }))
}
