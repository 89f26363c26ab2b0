//! Entry form and admin entry-log handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;
use validator::Validate;

use super::today;
use crate::{
    dtos::{
        EntryListResponse, EntryQuery, RecordEntryRequest, RecordEntryResponse,
        UpdateEntryRequest,
    },
    models::{BillWarning, Entry, EntryFilter, EntrySuggestions, FormDraft},
    startup::AppState,
};

/// Record one issuance or return from the entry form.
pub async fn record_entry(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<RecordEntryRequest>,
) -> Result<(StatusCode, Json<RecordEntryResponse>), AppError> {
    payload.validate()?;

    let entry = state
        .entries
        .record(payload.into_new_entry(today()))
        .await?;
    tracing::debug!(request_id = %request_id.0, row = entry.row, "Entry form submitted");
    let draft = FormDraft::after_submit(&entry, Utc::now(), state.config.draft_ttl());

    Ok((StatusCode::CREATED, Json(RecordEntryResponse { entry, draft })))
}

pub async fn suggestions(
    State(state): State<AppState>,
) -> Result<Json<EntrySuggestions>, AppError> {
    Ok(Json(state.entries.suggestions().await?))
}

/// Filtered view of the log for the admin screen.
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<EntryListResponse>, AppError> {
    let filter = EntryFilter::from(query);
    let ingestion = state.entries.load().await?;

    let mut warnings = Vec::new();
    if ingestion.skipped_dates > 0 {
        warnings.push(BillWarning::DateParseSkipped(ingestion.skipped_dates));
    }

    let entries = filter.apply(&ingestion.entries, today());
    tracing::debug!(window = %filter.window, count = entries.len(), "Listing entries");

    Ok(Json(EntryListResponse { entries, warnings }))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(payload): Json<UpdateEntryRequest>,
) -> Result<Json<Entry>, AppError> {
    payload.validate()?;
    let entry = state.entries.update(index, payload.into()).await?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<StatusCode, AppError> {
    state.entries.delete(index).await?;
    Ok(StatusCode::NO_CONTENT)
}
