use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::server::endpoints::{files, parse, planner, status, users};
use crate::types::PlannerState;

mod endpoints;
mod types;

pub use types::ApiErrorType;

/// Largest accepted request body; scanned calendars can be large.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<PlannerState>) -> Router {
    let parse_router = Router::new()
        .route("/timetable", post(parse::post_parse_timetable))
        .route("/calendar", post(parse::post_parse_calendar));

    let files_router = Router::new()
        .route("/upload-timetable", post(files::post_upload_timetable))
        .route("/upload-calendar", post(files::post_upload_calendar))
        .route("/timetable-summary", post(files::post_timetable_summary))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    let api_router = Router::new()
        .nest("/parse", parse_router)
        .nest("/files", files_router)
        .route("/attendance", post(planner::post_attendance))
        .route("/optimization/leave", post(planner::post_leave_optimization))
        .route("/users/:user_id", delete(users::delete_user));

    Router::new()
        .route("/health", get(status::get_health))
        .nest("/api", api_router)
        .with_state(app_state)
}
