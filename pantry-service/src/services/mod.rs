//! Services module for pantry-service.

pub mod composer;
pub mod entry_log;
pub mod export;
pub mod ingest;
pub mod metrics;
pub mod rate_book;
pub mod reducer;
pub mod sheet;

pub use composer::{build_bill_report, compose, ComposeOptions};
pub use entry_log::EntryLog;
pub use export::{bill_to_csv, EXPORT_FILE_NAME};
pub use ingest::{ingest_entries, ingest_rates, Ingestion};
pub use metrics::{get_metrics, init_metrics};
pub use rate_book::RateBook;
pub use reducer::{reduce, reduce_for_billing, reduce_for_usage, GroupField};
pub use sheet::{CsvSheet, MemorySheet, Sheet};
