pub mod calendar;
pub mod compliance;
pub mod feed;
pub mod obligations;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maintcal_core::{DateWindow, MaintCalError};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(compliance::router())
        .merge(calendar::router())
        .merge(obligations::router())
        .merge(feed::router())
        .with_state(state)
}

/// Query string shared by the window-based endpoints.
/// `start` and `end` default to the current calendar month.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub location_id: Option<u64>,
}

impl RangeQuery {
    pub fn window(&self, state: &AppState) -> Result<DateWindow, MaintCalError> {
        DateWindow::from_args(self.start.as_deref(), self.end.as_deref(), state.today())
    }
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert anyhow errors to HTTP responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<MaintCalError>() {
            Some(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Some(MaintCalError::ObligationNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
