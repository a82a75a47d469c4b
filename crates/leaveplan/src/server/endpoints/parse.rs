//! Stateless parsing of raw OCR text.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::json_body;
use crate::parse::{parse_calendar_text, parse_timetable_text};
use crate::types::PlannerState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTextRequest {
    pub raw_ocr_text: String,
}

/// POST /api/parse/timetable
pub async fn post_parse_timetable(
    State(s): State<Arc<PlannerState>>,
    payload: Result<Json<RawTextRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    info!(chars = request.raw_ocr_text.len(), "POST /api/parse/timetable");

    let parsed = parse_timetable_text(&s.config.parser, &request.raw_ocr_text);
    (StatusCode::OK, Json(parsed)).into_response()
}

/// POST /api/parse/calendar
pub async fn post_parse_calendar(payload: Result<Json<RawTextRequest>, JsonRejection>) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    info!(chars = request.raw_ocr_text.len(), "POST /api/parse/calendar");

    let entries = parse_calendar_text(&request.raw_ocr_text);
    (StatusCode::OK, Json(entries)).into_response()
}
