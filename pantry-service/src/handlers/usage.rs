use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

use super::today;
use crate::{
    dtos::{EntryQuery, UsageResponse},
    models::{BillWarning, EntryFilter},
    services::reduce_for_usage,
    startup::AppState,
};

/// Issued, returned and net quantity per (person, item).
pub async fn get_usage(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<UsageResponse>, AppError> {
    let filter = EntryFilter::from(query);
    let ingestion = state.entries.load().await?;

    let warnings = match ingestion.skipped_dates {
        0 => Vec::new(),
        n => vec![BillWarning::DateParseSkipped(n)],
    };
    let selected = filter.apply(&ingestion.entries, today());

    Ok(Json(UsageResponse {
        rows: reduce_for_usage(&selected),
        warnings,
    }))
}
