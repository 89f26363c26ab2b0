use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::UpsertRateRequest,
    models::{ItemRate, RateTable},
    startup::AppState,
};

pub async fn list_rates(State(state): State<AppState>) -> Result<Json<RateTable>, AppError> {
    Ok(Json(state.rates.load().await?))
}

/// Set one item's rate. Last write wins.
pub async fn upsert_rate(
    State(state): State<AppState>,
    Json(payload): Json<UpsertRateRequest>,
) -> Result<Json<ItemRate>, AppError> {
    payload.validate()?;
    let rate = state.rates.upsert(&payload.item, payload.rate).await?;
    Ok(Json(rate))
}
