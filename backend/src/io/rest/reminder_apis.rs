//! # REST API for Reminders

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::report_mapper::ReportMapper;
use crate::AppState;

/// Create a router for reminder related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/reminders", get(list_pending_reminders))
}

/// Unsent reminders of active subscriptions
pub async fn list_pending_reminders(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /reminders");

    match state.reminder_service.pending_reminders().await {
        Ok(pending) => {
            (StatusCode::OK, Json(ReportMapper::reminders_to_dto_list(pending))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
