//! ICS calendar feed endpoint

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use maintcal_core::ics::{feed_entries, generate_feed};
use maintcal_core::{ObligationStore, build_compliance_report};

use crate::routes::{AppError, RangeQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/feed.ics", get(calendar_feed))
}

/// GET /feed.ics?start&end&location_id - Occurrences as an iCalendar feed
async fn calendar_feed(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
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
    let entries = feed_entries(&report.rows, state.feed());
    let ics = generate_feed(&entries, state.feed());

    Ok(([(header::CONTENT_TYPE, "text/calendar; charset=utf-8")], ics))
}
