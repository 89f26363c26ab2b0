//! Domain errors for pantry-service.

use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PantryError {
    /// A stored entry row breaks the input contract.
    #[error("Invalid entry at row {row}: {reason}")]
    InvalidEntry { row: usize, reason: String },

    #[error("Invalid rate for '{item}': {reason}")]
    InvalidRate { item: String, reason: String },

    #[error("Row {index} out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// A bill amount does not fit in a decimal.
    #[error("Amount overflow computing {0}")]
    AmountOverflow(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl PantryError {
    pub fn invalid_entry(row: usize, reason: impl Into<String>) -> Self {
        PantryError::InvalidEntry {
            row,
            reason: reason.into(),
        }
    }

    /// Short label for error metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PantryError::InvalidEntry { .. } => "invalid_entry",
            PantryError::InvalidRate { .. } => "invalid_rate",
            PantryError::RowOutOfRange { .. } => "row_out_of_range",
            PantryError::AmountOverflow(_) => "amount_overflow",
            PantryError::Validation(_) => "validation",
            PantryError::Storage(_) => "storage",
        }
    }
}

impl From<csv::Error> for PantryError {
    fn from(err: csv::Error) -> Self {
        PantryError::Storage(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for PantryError {
    fn from(err: std::io::Error) -> Self {
        PantryError::Storage(anyhow::Error::new(err))
    }
}

impl From<PantryError> for AppError {
    fn from(err: PantryError) -> Self {
        crate::services::metrics::ERRORS_TOTAL
            .with_label_values(&[err.kind()])
            .inc();

        match err {
            e @ PantryError::InvalidEntry { .. } => AppError::Unprocessable(anyhow::anyhow!(e)),
            e @ PantryError::InvalidRate { .. } => AppError::Unprocessable(anyhow::anyhow!(e)),
            e @ PantryError::RowOutOfRange { .. } => AppError::NotFound(anyhow::anyhow!(e)),
            e @ PantryError::AmountOverflow(_) => AppError::Unprocessable(anyhow::anyhow!(e)),
            PantryError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            PantryError::Storage(e) => AppError::StorageError(e),
        }
    }
}
