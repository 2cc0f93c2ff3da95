use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tracing::{debug, info};

use crate::error::DashboardError;
use crate::models::{CsvRecord, OrderTable, REQUIRED_COLUMNS};

/// Parse an uploaded CSV into an [`OrderTable`].
///
/// The header row must name every column in [`REQUIRED_COLUMNS`]; column order
/// is free and extra columns are ignored. Any missing column or unparsable date
/// aborts the whole load; a blank or non-numeric number cell is kept as a
/// missing value. Pure in its input: the same bytes always give the same table.
pub fn load_bytes(bytes: &[u8]) -> Result<OrderTable, DashboardError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| DashboardError::MalformedInput(format!("reading header row: {e}")))?
        .clone();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::missing_columns(&missing));
    }

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize::<CsvRecord>().enumerate() {
        let row = i + 1;
        let record = result.map_err(|e| DashboardError::unparsable_row(row, &e))?;
        rows.push(record.to_order(row)?);
    }

    debug!(bytes = bytes.len(), columns = headers.len(), "Parsed CSV upload");
    info!("Loaded {} orders", rows.len());
    Ok(OrderTable::new(rows))
}

/// Read a CSV file from disk and load it.
pub fn load_path(path: &Path) -> Result<OrderTable, DashboardError> {
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes)
}
