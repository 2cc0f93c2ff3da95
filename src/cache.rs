//! Single-entry memo of the last parsed upload.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

use crate::error::DashboardError;
use crate::loader;
use crate::models::OrderTable;

type ContentKey = [u8; 32];

struct CacheEntry {
    key: ContentKey,
    table: Arc<OrderTable>,
}

/// Holds the table of the most recent upload, keyed on the SHA-256 of its bytes.
///
/// A new upload replaces the entry. A failed load leaves the previous entry
/// in place.
#[derive(Default)]
pub struct LoadCache {
    entry: Option<CacheEntry>,
    hits: u64,
    misses: u64,
}

fn content_key(bytes: &[u8]) -> ContentKey {
    let mut key = [0u8; 32];
    key.copy_from_slice(&Sha256::digest(bytes));
    key
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `bytes`, parsing with [`loader::load_bytes`] on a miss.
    pub fn get_or_load(&mut self, bytes: &[u8]) -> Result<Arc<OrderTable>, DashboardError> {
        self.get_or_compute(bytes, loader::load_bytes)
    }

    pub fn get_or_compute<F>(&mut self, bytes: &[u8], compute: F) -> Result<Arc<OrderTable>, DashboardError>
    where
        F: FnOnce(&[u8]) -> Result<OrderTable, DashboardError>,
    {
        let key = content_key(bytes);
        if let Some(entry) = &self.entry {
            if entry.key == key {
                self.hits += 1;
                debug!(hits = self.hits, "Load cache hit");
                return Ok(entry.table.clone());
            }
        }

        self.misses += 1;
        debug!(misses = self.misses, "Load cache miss");
        let table = Arc::new(compute(bytes)?);
        self.entry = Some(CacheEntry {
            key,
            table: table.clone(),
        });
        Ok(table)
    }

    /// Table of the current entry, if any upload has loaded successfully.
    pub fn current(&self) -> Option<Arc<OrderTable>> {
        self.entry.as_ref().map(|e| e.table.clone())
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_A: &str = "order_id,order_date,ship_date,delivery_date,units_sold,unit_price,shipping_cost,fulfillment_cost,delivery_status,region,warehouse_id,product_category\n\
                         1,2024-01-01,2024-01-02,2024-01-04,1,10,1,1,On Time,US,W1,Books\n";

    #[test]
    fn test_same_bytes_hit() {
        let mut cache = LoadCache::new();
        let first = cache.get_or_load(CSV_A.as_bytes()).unwrap();
        let second = cache.get_or_load(CSV_A.as_bytes()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_new_upload_replaces_entry() {
        let mut cache = LoadCache::new();
        let csv_b = CSV_A.replace("Books", "Toys");
        let a = cache.get_or_load(CSV_A.as_bytes()).unwrap();
        let b = cache.get_or_load(csv_b.as_bytes()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.rows()[0].product_category, "Toys");

        // single entry: going back to A re-parses
        cache.get_or_load(CSV_A.as_bytes()).unwrap();
        assert_eq!(cache.misses(), 3);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_compute_runs_once_per_input() {
        let mut cache = LoadCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            cache
                .get_or_compute(b"x", |_| {
                    calls += 1;
                    Ok(OrderTable::default())
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_failed_load_keeps_previous_entry() {
        let mut cache = LoadCache::new();
        let good = cache.get_or_load(CSV_A.as_bytes()).unwrap();
        assert!(cache.get_or_load(b"garbage").is_err());
        let current = cache.current().unwrap();
        assert!(Arc::ptr_eq(&good, &current));
    }

    #[test]
    fn test_one_byte_difference_misses() {
        let mut cache = LoadCache::new();
        let mut calls = 0;
        for input in [&b"abc"[..], &b"abd"[..], &b"abd"[..]] {
            cache
                .get_or_compute(input, |_| {
                    calls += 1;
                    Ok(OrderTable::default())
                })
                .unwrap();
        }
        assert_eq!(calls, 2);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_content_key_is_sha256() {
        let key = content_key(b"abc");
        assert_eq!(key[..4], [0xba, 0x78, 0x16, 0xbf]);
    }

    #[test]
    fn test_clear() {
        let mut cache = LoadCache::new();
        cache.get_or_load(CSV_A.as_bytes()).unwrap();
        cache.clear();
        assert!(cache.current().is_none());
    }
}
