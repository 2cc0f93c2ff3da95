use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("no file has been uploaded yet")]
    MissingInput,

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn missing_columns(columns: &[&str]) -> Self {
        DashboardError::MalformedInput(format!("missing required columns: {}", columns.join(", ")))
    }

    pub fn unparsable_date(row: usize, column: &str, value: &str) -> Self {
        DashboardError::MalformedInput(format!("row {row}: cannot parse {column} '{value}' as a date"))
    }

    pub fn unparsable_row(row: usize, err: &csv::Error) -> Self {
        DashboardError::MalformedInput(format!("row {row}: {err}"))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, DashboardError::MalformedInput(_))
    }
}
