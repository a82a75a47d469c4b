//! Database types for stored timetables and calendars.

use crate::model::{AcademicCalendar, ParseConfidence, Timetable};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored data for user '{user_id}' is unreadable: {message}")]
    Corrupt { user_id: String, message: String },

    #[error("database lock poisoned")]
    Poisoned,
}

/// Where an upload came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMeta {
    pub source_file: Option<String>,
    /// Hex SHA-256 of the uploaded bytes
    pub content_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTimetable {
    pub user_id: String,
    pub timetable: Timetable,
    pub confidence: ParseConfidence,
    #[serde(flatten)]
    pub meta: UploadMeta,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCalendar {
    pub calendar: AcademicCalendar,
    #[serde(flatten)]
    pub meta: UploadMeta,
    pub uploaded_at: DateTime<Utc>,
}
