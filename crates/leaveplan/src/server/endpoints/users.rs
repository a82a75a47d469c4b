use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::error::PlannerError;
use crate::server::types::ApiErrorType;
use crate::types::PlannerState;

/// DELETE /api/users/:user_id
///
/// Drops the user's timetable and calendar. Waits for any upload in flight
/// for the same user.
pub async fn delete_user(
    Path(user_id): Path<String>,
    State(s): State<Arc<PlannerState>>,
) -> Response {
    info!("DELETE /api/users/{}", user_id);

    let _lock = s.lock_user(&user_id).await;

    match s.db.delete_user(&user_id) {
        Ok(removed) => (StatusCode::OK, Json(json!({ "removed": removed }))).into_response(),
        Err(e) => ApiErrorType::from(PlannerError::from(e)).into_response(),
    }
}
