use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::PlannerError;

/// JSON error envelope: `{error, message, details?}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, message, details): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: message.to_string(),
            details,
        }
    }
}

impl From<PlannerError> for ApiErrorType {
    fn from(error: PlannerError) -> Self {
        match &error {
            PlannerError::MissingInput(msg) => (StatusCode::NOT_FOUND, msg.as_str(), None).into(),
            PlannerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str(), None).into(),
            PlannerError::Ocr(_) => (
                StatusCode::BAD_GATEWAY,
                "Could not extract text from the uploaded file",
                Some(error.to_string()),
            )
                .into(),
            PlannerError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to access stored data",
                Some(error.to_string()),
            )
                .into(),
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
