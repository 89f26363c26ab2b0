//! Billing summary and export.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use std::collections::BTreeMap;

use super::today;
use crate::{
    dtos::BillQuery,
    models::{BillOutcome, BillReport},
    services::{bill_to_csv, build_bill_report, compose, metrics::BILLS_COMPOSED_TOTAL, EXPORT_FILE_NAME},
    startup::AppState,
};

async fn load_report(state: &AppState, query: &BillQuery) -> Result<BillReport, AppError> {
    let ingestion = state.entries.load().await?;
    let rates = state.rates.load().await?;
    let filter = query.filter();

    let report = build_bill_report(&ingestion, &filter, today(), &rates, query.options())?;

    if let BillOutcome::Ready(bill) = &report.outcome {
        BILLS_COMPOSED_TOTAL
            .with_label_values(&[filter.window.as_str()])
            .inc();
        tracing::info!(window = %filter.window, rows = bill.rows.len(), "Bill composed");
    } else {
        tracing::info!(window = %filter.window, "No entries to bill");
    }

    Ok(report)
}

pub async fn get_bill(
    State(state): State<AppState>,
    Query(query): Query<BillQuery>,
) -> Result<Json<BillReport>, AppError> {
    Ok(Json(load_report(&state, &query).await?))
}

/// CSV download. An empty selection yields the header row only.
pub async fn export_bill(
    State(state): State<AppState>,
    Query(query): Query<BillQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = load_report(&state, &query).await?;

    let bill = match report.outcome {
        BillOutcome::Ready(bill) => bill,
        BillOutcome::EmptyInput => {
            let rates = state.rates.load().await?;
            compose(&BTreeMap::new(), &rates, query.options())?
        }
    };
    let body = bill_to_csv(&bill)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        body,
    ))
}
