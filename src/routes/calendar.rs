//! Calendar view endpoint

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use maintcal_core::report::ReportRange;
use maintcal_core::{ObligationStore, Occurrence, calendar_occurrences};
use serde::Serialize;

use crate::routes::{AppError, RangeQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/calendar", get(list_occurrences))
}

#[derive(Serialize)]
pub struct CalendarResponse {
    pub range: ReportRange,
    pub occurrences: Vec<Occurrence>,
}

/// GET /calendar?start&end&location_id - Occurrences for the calendar view
async fn list_occurrences(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let window = query.window(&state)?;
    let store = state.store();
    let obligations = store.obligations(query.location_id)?;

    let occurrences = calendar_occurrences(&obligations, &window, state.today(), store)?;

    Ok(Json(CalendarResponse {
        range: ReportRange {
            start: window.start(),
            end: window.end(),
            location_id: query.location_id,
        },
        occurrences,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{get_json, make_test_state};

    #[tokio::test]
    async fn test_calendar_matches_report_statuses() {
        let state = make_test_state();
        let uri = "start=2025-05-01&end=2025-08-31";
        let (_, calendar) = get_json(&state, &format!("/calendar?{uri}")).await;
        let (_, report) = get_json(&state, &format!("/compliance?{uri}")).await;

        let mut from_calendar: Vec<String> = calendar["occurrences"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| format!("{} {} {}", o["obligation_id"], o["due_date"], o["status"]))
            .collect();
        let mut from_report: Vec<String> = report["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| format!("{} {} {}", r["obligation_id"], r["due_date"], r["status"]))
            .collect();
        from_calendar.sort();
        from_report.sort();

        assert_eq!(from_calendar, from_report);
        assert_eq!(from_calendar.len(), 5);
    }

    #[tokio::test]
    async fn test_calendar_location_filter() {
        let state = make_test_state();
        let (status, body) = get_json(&state, "/calendar?location_id=2").await;

        assert_eq!(status, StatusCode::OK);
        let occurrences = body["occurrences"].as_array().unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0]["obligation_id"], "pm-2");
        assert_eq!(occurrences[0]["status"], "missed");
    }
}
