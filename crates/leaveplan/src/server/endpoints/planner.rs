use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use super::json_body;
use crate::error::PlannerError;
use crate::planner::{compute_attendance, AttendanceMode};
use crate::server::types::ApiErrorType;
use crate::types::{resolve_user_id, PlannerState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Overrides the configured mode for this request.
    #[serde(default)]
    pub mode: Option<AttendanceMode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

fn error_response(e: PlannerError) -> Response {
    if matches!(e, PlannerError::Store(_)) {
        error!("Planner request failed: {}", e);
    }
    ApiErrorType::from(e).into_response()
}

/// POST /api/attendance
///
/// Dates missing from the request fall back to the ones stored with the
/// user's calendar. Missing inputs still answer 200 with a message.
pub async fn post_attendance(
    State(s): State<Arc<PlannerState>>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    let user_id = resolve_user_id(request.user_id.as_deref());
    info!(user_id = %user_id, "POST /api/attendance");

    let (timetable, calendar) = match (s.db.get_timetable(&user_id), s.db.get_calendar(&user_id)) {
        (Ok(timetable), Ok(calendar)) => (timetable, calendar),
        (Err(e), _) | (_, Err(e)) => return error_response(e.into()),
    };

    let stored_start = calendar.as_ref().and_then(|c| c.calendar.start_date.clone());
    let stored_end = calendar.as_ref().and_then(|c| c.calendar.end_date.clone());
    let info = compute_attendance(
        request.start_date.or(stored_start).as_deref(),
        request.end_date.or(stored_end).as_deref(),
        timetable.as_ref().map(|t| &t.timetable),
        request.mode.unwrap_or_else(|| s.planner.attendance_mode()),
    );
    (StatusCode::OK, Json(info)).into_response()
}

/// POST /api/optimization/leave
pub async fn post_leave_optimization(
    State(s): State<Arc<PlannerState>>,
    payload: Result<Json<LeaveRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    let user_id = resolve_user_id(request.user_id.as_deref());
    info!(user_id = %user_id, "POST /api/optimization/leave");

    let calendar = match s.db.get_calendar(&user_id) {
        Ok(Some(stored)) => stored.calendar,
        Ok(None) => {
            return error_response(PlannerError::missing(format!(
                "No academic calendar found for user '{user_id}'. Please upload an academic calendar first."
            )))
        }
        Err(e) => return error_response(e.into()),
    };
    let timetable = match s.db.get_timetable(&user_id) {
        Ok(stored) => stored.map(|t| t.timetable),
        Err(e) => return error_response(e.into()),
    };

    let plan = s.planner.plan(&calendar, timetable.as_ref());
    info!(
        user_id = %user_id,
        suggestions = plan.strategic_leaves.len(),
        "Computed leave plan"
    );
    (StatusCode::OK, Json(plan)).into_response()
}
