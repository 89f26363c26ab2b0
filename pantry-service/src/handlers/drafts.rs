use crate::dtos::{DraftRequest, DraftResponse};
use crate::models::FormDraft;
use crate::startup::AppState;
use axum::{extract::State, Json};
use chrono::Utc;

use super::today;

/// Resume the caller's draft if it is still live, else hand out a fresh one.
pub async fn resume_draft(
    State(state): State<AppState>,
    payload: Option<Json<DraftRequest>>,
) -> Json<DraftResponse> {
    let previous = payload.and_then(|Json(req)| req.draft);
    let draft = FormDraft::resume(previous, Utc::now(), today(), state.config.draft_ttl());
    Json(DraftResponse { draft })
}
