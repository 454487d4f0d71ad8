//! Compliance report endpoint

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use maintcal_core::{ComplianceReport, ObligationStore, build_compliance_report};

use crate::routes::{AppError, RangeQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/compliance", get(compliance_report))
}

/// GET /compliance?start&end&location_id - Reconciled rows and status counts
async fn compliance_report(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ComplianceReport>, AppError> {
    let window = query.window(&state)?;
    let store = state.store();
    let obligations = store.obligations(query.location_id)?;

    let report = build_compliance_report(
        &obligations,
        &window,
        query.location_id,
        state.today(),
        store,
        store,
    )?;

    Ok(Json(report))
}
