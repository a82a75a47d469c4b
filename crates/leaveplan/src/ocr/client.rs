//! HTTP client for the external OCR service.
//!
//! One call is a single `POST {base_url}/recognize` carrying the raw file
//! bytes. The service answers `{"text": "..."}`. Transient failures are
//! retried with exponential backoff and jitter.

use super::error::OcrError;
use crate::config::OcrConfig;
use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

const RECOGNIZE_PATH: &str = "recognize";
const FILE_NAME_HEADER: &str = "X-File-Name";

/// Longest error body kept in an [`OcrError::Status`] message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    text: String,
}

/// Client for the OCR service.
pub struct OcrClient {
    client: Client,
    endpoint: Url,
    config: OcrConfig,
}

impl OcrClient {
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)?.join(RECOGNIZE_PATH)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OcrError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends the file to the OCR service and returns the recognized text.
    pub async fn recognize(&self, bytes: &[u8], file_name: &str) -> Result<String, OcrError> {
        let correlation_id = generate_correlation_id();
        let start = Instant::now();
        let max_attempts = self.config.max_attempts.max(1);

        info!(
            correlation_id = %correlation_id,
            file_name = %file_name,
            size = bytes.len(),
            "Sending file to OCR service"
        );

        let mut attempt = 1;
        loop {
            match self.attempt(bytes, file_name, &correlation_id).await {
                Ok(text) => {
                    info!(
                        correlation_id = %correlation_id,
                        attempt,
                        chars = text.len(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "OCR completed"
                    );
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry_delay(attempt);
                    warn!(
                        correlation_id = %correlation_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "OCR attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        correlation_id = %correlation_id,
                        attempts = attempt,
                        error = %e,
                        "OCR retries exhausted"
                    );
                    return Err(OcrError::RetriesExhausted {
                        attempts: attempt,
                        last: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!(correlation_id = %correlation_id, error = %e, "OCR failed");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(
        &self,
        bytes: &[u8],
        file_name: &str,
        correlation_id: &str,
    ) -> Result<String, OcrError> {
        debug!(correlation_id = %correlation_id, url = %self.endpoint, "POST recognize");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(FILE_NAME_HEADER, header_safe(file_name))
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Status {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let parsed: RecognizeResponse = response.json().await?;
        Ok(parsed.text)
    }

    /// Calculates retry delay with exponential backoff and jitter.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self.config.retry_base_delay_ms;
        // base * 2^min(attempt-1, 5), capped at 10 seconds
        let exponential = base.saturating_mul(2u64.pow(attempt.saturating_sub(1).min(5)));
        let capped = exponential.min(10_000);
        // 0-20% jitter
        let jitter = rand::thread_rng().gen_range(0..=(capped / 5));
        Duration::from_millis(capped + jitter)
    }
}

/// Header values must be visible ASCII; anything else becomes `_`.
fn header_safe(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect()
}

/// Generates a short id to tie together the log lines of one OCR call.
fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("ocr-{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}
