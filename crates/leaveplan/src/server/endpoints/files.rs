//! File uploads and the stored-timetable summary.
//!
//! Uploads are multipart forms with a `userId` field and one file field
//! (`timetable` or `calendar`). Uploads for the same user are serialized so
//! the last one to arrive is the one that sticks.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::json_body;
use crate::db::{content_digest, UploadMeta};
use crate::error::PlannerError;
use crate::model::{parse_flexible, to_dotted, AcademicCalendar};
use crate::ocr::extract_text;
use crate::parse::{parse_calendar_text, parse_timetable_text};
use crate::planner::summarize;
use crate::server::types::ApiErrorType;
use crate::types::{resolve_user_id, PlannerState};

const TIMETABLE_FIELD: &str = "timetable";
const CALENDAR_FIELD: &str = "calendar";

/// An uploaded file.
#[derive(Debug)]
struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

/// Everything a multipart upload may carry.
#[derive(Debug, Default)]
struct UploadForm {
    user_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    file: Option<UploadedFile>,
}

impl UploadForm {
    /// Reads the whole form. Unknown fields are skipped.
    async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, PlannerError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| PlannerError::bad_request(format!("Malformed upload: {}", e.body_text())))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == file_field {
                let file_name = field.file_name().unwrap_or(file_field).to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| PlannerError::bad_request(format!("Malformed upload: {}", e.body_text())))?;
                form.file = Some(UploadedFile {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
                continue;
            }

            let slot = match name.as_str() {
                "userId" => &mut form.user_id,
                "startDate" => &mut form.start_date,
                "endDate" => &mut form.end_date,
                _ => continue,
            };
            let value = field
                .text()
                .await
                .map_err(|e| PlannerError::bad_request(format!("Malformed upload: {}", e.body_text())))?;
            *slot = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        }
        Ok(form)
    }

    fn take_file(&mut self, file_field: &str) -> Result<UploadedFile, PlannerError> {
        match self.file.take() {
            Some(file) if !file.bytes.is_empty() => Ok(file),
            Some(_) => Err(PlannerError::bad_request(format!(
                "The uploaded {file_field} file is empty"
            ))),
            None => Err(PlannerError::bad_request(format!(
                "No {file_field} file uploaded"
            ))),
        }
    }
}

fn upload_meta(file: &UploadedFile) -> UploadMeta {
    UploadMeta {
        source_file: Some(file.name.clone()),
        content_sha256: content_digest(&file.bytes),
    }
}

fn error_response(e: PlannerError) -> Response {
    match &e {
        PlannerError::Ocr(_) | PlannerError::Store(_) => error!("Upload failed: {}", e),
        _ => warn!("Upload rejected: {}", e),
    }
    ApiErrorType::from(e).into_response()
}

/// POST /api/files/upload-timetable
pub async fn post_upload_timetable(
    State(s): State<Arc<PlannerState>>,
    multipart: Multipart,
) -> Response {
    match upload_timetable(&s, multipart).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn upload_timetable(
    s: &PlannerState,
    multipart: Multipart,
) -> Result<serde_json::Value, PlannerError> {
    let mut form = UploadForm::read(multipart, TIMETABLE_FIELD).await?;
    let user_id = resolve_user_id(form.user_id.as_deref());
    let file = form.take_file(TIMETABLE_FIELD)?;
    info!(
        user_id = %user_id,
        file_name = %file.name,
        size = file.bytes.len(),
        "POST /api/files/upload-timetable"
    );

    let _lock = s.lock_user(&user_id).await;

    let text = extract_text(&s.ocr, &file.bytes, &file.name).await?;
    let parsed = parse_timetable_text(&s.config.parser, &text);
    let stored =
        s.db.replace_timetable(&user_id, &parsed.timetable, parsed.confidence, upload_meta(&file))?;

    Ok(json!({
        "message": "Timetable uploaded successfully",
        "userId": stored.user_id,
        "confidence": parsed.confidence,
        "matchedCells": parsed.matched_cells,
        "recoveredCells": parsed.recovered_cells,
        "summary": summarize(&stored.timetable),
        "timetable": stored.timetable,
        "contentSha256": stored.meta.content_sha256,
        "uploadedAt": stored.uploaded_at,
    }))
}

/// POST /api/files/upload-calendar
pub async fn post_upload_calendar(
    State(s): State<Arc<PlannerState>>,
    multipart: Multipart,
) -> Response {
    match upload_calendar(&s, multipart).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn upload_calendar(
    s: &PlannerState,
    multipart: Multipart,
) -> Result<serde_json::Value, PlannerError> {
    let mut form = UploadForm::read(multipart, CALENDAR_FIELD).await?;
    let user_id = resolve_user_id(form.user_id.as_deref());
    let (start_date, end_date) = semester_bounds(form.start_date.as_deref(), form.end_date.as_deref())?;
    let file = form.take_file(CALENDAR_FIELD)?;
    info!(
        user_id = %user_id,
        file_name = %file.name,
        size = file.bytes.len(),
        "POST /api/files/upload-calendar"
    );

    let _lock = s.lock_user(&user_id).await;

    let text = extract_text(&s.ocr, &file.bytes, &file.name).await?;
    let calendar = AcademicCalendar {
        user_id,
        entries: parse_calendar_text(&text),
        start_date,
        end_date,
    };
    if calendar.entries.is_empty() {
        warn!(user_id = %calendar.user_id, "No calendar entries recognized in upload");
    }
    let stored = s.db.replace_calendar(&calendar, upload_meta(&file))?;

    Ok(json!({
        "message": "Academic calendar uploaded successfully",
        "userId": stored.calendar.user_id,
        "entryCount": stored.calendar.entries.len(),
        "entries": stored.calendar.entries,
        "startDate": stored.calendar.start_date,
        "endDate": stored.calendar.end_date,
        "contentSha256": stored.meta.content_sha256,
        "uploadedAt": stored.uploaded_at,
    }))
}

/// Validates optional semester boundaries and converts them to `DD.MM.YYYY`.
fn semester_bounds(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<String>, Option<String>), PlannerError> {
    let convert = |label: &str, value: Option<&str>| -> Result<Option<String>, PlannerError> {
        value
            .map(|v| {
                to_dotted(v).ok_or_else(|| {
                    PlannerError::bad_request(format!(
                        "{label} '{v}' is not a date (expected DD.MM.YYYY or YYYY-MM-DD)"
                    ))
                })
            })
            .transpose()
    };
    let start_date = convert("startDate", start)?;
    let end_date = convert("endDate", end)?;

    if let (Some(s), Some(e)) = (start_date.as_deref(), end_date.as_deref()) {
        if parse_flexible(s) > parse_flexible(e) {
            return Err(PlannerError::bad_request(format!(
                "startDate {s} is after endDate {e}"
            )));
        }
    }
    Ok((start_date, end_date))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// POST /api/files/timetable-summary
pub async fn post_timetable_summary(
    State(s): State<Arc<PlannerState>>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    let user_id = resolve_user_id(request.user_id.as_deref());
    info!(user_id = %user_id, "POST /api/files/timetable-summary");

    match s.db.get_timetable(&user_id) {
        Ok(Some(stored)) => (
            StatusCode::OK,
            Json(json!({
                "summary": summarize(&stored.timetable),
                "timetable": stored.timetable,
            })),
        )
            .into_response(),
        Ok(None) => error_response(PlannerError::missing(format!(
            "No timetable found for user '{user_id}'. Please upload a timetable first."
        ))),
        Err(e) => error_response(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semester_bounds() {
        assert_eq!(
            semester_bounds(Some("2025-01-06"), Some("30.04.2025")).unwrap(),
            (Some("06.01.2025".to_string()), Some("30.04.2025".to_string()))
        );
        assert_eq!(semester_bounds(None, None).unwrap(), (None, None));
        assert!(matches!(
            semester_bounds(Some("soon"), None),
            Err(PlannerError::BadRequest(_))
        ));
        assert!(matches!(
            semester_bounds(Some("30.04.2025"), Some("06.01.2025")),
            Err(PlannerError::BadRequest(_))
        ));
    }
}
