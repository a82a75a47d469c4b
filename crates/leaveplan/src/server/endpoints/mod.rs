pub mod files;
pub mod parse;
pub mod planner;
pub mod status;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;

use crate::server::types::ApiErrorType;

/// Unwraps a JSON body, turning axum's rejection into the error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiErrorType> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "Invalid JSON body",
            Some(rejection.body_text()),
        ))
    })
}
