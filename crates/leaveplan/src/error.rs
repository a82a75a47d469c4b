//! Errors surfaced by request handling.

use crate::db::StoreError;
use crate::ocr::OcrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Something the request depends on was never uploaded
    #[error("{0}")]
    MissingInput(String),

    /// Malformed form data, missing file, bad dates
    #[error("{0}")]
    BadRequest(String),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("storage failed: {0}")]
    Store(#[from] StoreError),
}

impl PlannerError {
    pub fn missing(what: impl Into<String>) -> Self {
        PlannerError::MissingInput(what.into())
    }

    pub fn bad_request(what: impl Into<String>) -> Self {
        PlannerError::BadRequest(what.into())
    }
}
