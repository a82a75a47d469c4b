//! Error types for the OCR client.

use thiserror::Error;

/// Errors that can occur while turning an uploaded file into text.
#[derive(Debug, Error, Clone)]
pub enum OcrError {
    /// Connection failure, timeout or other transport problem
    #[error("Network error: {message}")]
    Network { message: String },

    /// The service answered with a non-success status
    #[error("OCR service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered 2xx but the body was not `{"text": ...}`
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    UrlError { message: String },

    /// Every attempt failed with a transient error
    #[error("OCR failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl OcrError {
    /// Returns true if this error is potentially transient and retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            OcrError::Network { .. } => true,
            OcrError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return OcrError::UnexpectedResponse {
                message: err.to_string(),
            };
        }
        OcrError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for OcrError {
    fn from(err: url::ParseError) -> Self {
        OcrError::UrlError {
            message: err.to_string(),
        }
    }
}
