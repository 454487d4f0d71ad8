//! Completion logging endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use maintcal_core::date::parse_iso_date;
use maintcal_core::{
    CompletionLedger, CompletionOutcome, CompletionRequest, MaintCalError, ObligationId,
    ObligationStore, last_completed, log_completion,
};
use serde::{Deserialize, Serialize};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/obligations/{id}/completions", post(create_completion))
        .route("/obligations/{id}/last-completed", get(get_last_completed))
}

/// Request body for logging a completion
#[derive(Deserialize)]
pub struct CompletionBody {
    pub due_date: String,
    /// Defaults to today
    pub completed_at: Option<String>,
    pub notes: Option<String>,
}

impl CompletionBody {
    fn into_request(self) -> Result<CompletionRequest, MaintCalError> {
        let completed_at = self.completed_at.as_deref().map(parse_date).transpose()?;
        Ok(CompletionRequest {
            due_date: parse_date(&self.due_date)?,
            completed_at,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

#[derive(Serialize)]
pub struct LastCompletedResponse {
    pub obligation_id: ObligationId,
    pub last_completed: Option<NaiveDate>,
}

fn parse_date(s: &str) -> Result<NaiveDate, MaintCalError> {
    parse_iso_date(s).ok_or_else(|| MaintCalError::InvalidDate(s.to_string()))
}

/// POST /obligations/:id/completions - Log (or re-log) a completion
async fn create_completion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CompletionBody>,
) -> Result<Json<CompletionOutcome>, AppError> {
    let id: ObligationId = id.parse()?;
    let request = body.into_request()?;
    let store = state.store();

    let outcome = log_completion(store, store, id, request, state.today())?;

    Ok(Json(outcome))
}

/// GET /obligations/:id/last-completed - Latest completion date from the ledger
async fn get_last_completed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LastCompletedResponse>, AppError> {
    let id: ObligationId = id.parse()?;
    let store = state.store();

    if store.obligation(id)?.is_none() {
        return Err(MaintCalError::ObligationNotFound(id).into());
    }
    let records = store.records_for(id)?;

    Ok(Json(LastCompletedResponse {
        obligation_id: id,
        last_completed: last_completed(&records),
    }))
}
