//! Session state behind the REST handlers.
//!
//! One upload per server. Renders are serialized through a single lock, so
//! each pass runs to completion before the next one starts.

use axum::body::Bytes;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cache::LoadCache;
use crate::dashboard::{self, RenderOutcome, PREVIEW_ROWS};
use crate::error::DashboardError;
use crate::filter::{FilterOptions, FilterRequest};
use crate::models::OrderRecord;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Default)]
struct Session {
    upload: Option<Bytes>,
    cache: LoadCache,
}

#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub rows: usize,
    pub preview: Vec<OrderRecord>,
    pub options: FilterOptions,
}

// ============================================================================
// Dashboard Service
// ============================================================================

#[derive(Default)]
pub struct DashboardService {
    session: Mutex<Session>,
}

impl DashboardService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current upload. A malformed upload is rejected and the
    /// previous one stays active.
    pub async fn upload(&self, bytes: Bytes) -> Result<UploadSummary, DashboardError> {
        let mut session = self.session.lock().await;
        let table = match session.cache.get_or_load(&bytes) {
            Ok(table) => table,
            Err(e) => {
                warn!("Rejected upload of {} bytes: {}", bytes.len(), e);
                return Err(e);
            }
        };
        session.upload = Some(bytes);
        info!("Accepted upload with {} orders", table.len());

        Ok(UploadSummary {
            rows: table.len(),
            preview: table.head(PREVIEW_ROWS).to_vec(),
            options: FilterOptions::from_table(&table),
        })
    }

    pub async fn options(&self) -> Result<FilterOptions, DashboardError> {
        let session = self.session.lock().await;
        match (&session.upload, session.cache.current()) {
            (Some(_), Some(table)) => Ok(FilterOptions::from_table(&table)),
            _ => Err(DashboardError::MissingInput),
        }
    }

    pub async fn render(&self, request: &FilterRequest) -> Result<RenderOutcome, DashboardError> {
        let mut session = self.session.lock().await;
        let Session { upload, cache } = &mut *session;
        dashboard::render(upload.as_deref(), cache, request)
    }

    /// Cache hit/miss counters.
    pub async fn cache_stats(&self) -> (u64, u64) {
        let session = self.session.lock().await;
        (session.cache.hits(), session.cache.misses())
    }
}
