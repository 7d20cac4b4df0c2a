//! Shared HTTP plumbing for providers and downloads
//!
//! Transient failures (timeouts, connection errors, 429 and 5xx) are
//! retried with exponential backoff; anything else fails immediately.

use elga_core::{ElgaError, Result};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

pub(crate) fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

pub(crate) fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => is_retryable_status(*code),
        _ => false,
    }
}

pub(crate) fn is_retryable_status(code: u16) -> bool {
    matches!(code, 429 | 500 | 502 | 503 | 504)
}

fn backoff_delay(attempt: usize) -> Duration {
    Duration::from_millis(RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt))
}

/// POST a JSON payload and parse the JSON response
pub(crate) fn post_json_with_retry(
    url: &str,
    headers: &[(&str, String)],
    payload: &serde_json::Value,
    provider: &str,
) -> Result<serde_json::Value> {
    for attempt in 0..MAX_RETRIES {
        let agent = build_agent();
        let mut request = agent.post(url).header("Content-Type", "application/json");
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        match request.send_json(payload) {
            Ok(mut ok) => {
                return ok.body_mut().read_json().map_err(|e| {
                    ElgaError::ProviderError(format!(
                        "Failed to parse {} response: {}",
                        provider, e
                    ))
                });
            }
            Err(e) => {
                if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                    tracing::warn!(provider, attempt = attempt + 1, error = %e, "retrying request");
                    std::thread::sleep(backoff_delay(attempt));
                    continue;
                }
                return Err(ElgaError::HttpError(format!(
                    "{} API request failed: {}",
                    provider, e
                )));
            }
        }
    }

    Err(ElgaError::HttpError(format!(
        "{} API request failed after retries",
        provider
    )))
}

/// GET `url` and hand the body reader to `sink`, retrying transient errors
pub(crate) fn get_with_retry<T>(
    url: &str,
    mut sink: impl FnMut(&mut dyn std::io::Read) -> Result<T>,
) -> Result<T> {
    for attempt in 0..MAX_RETRIES {
        let agent = build_agent();
        match agent.get(url).call() {
            Ok(ok) => {
                let mut reader = ok.into_body().into_reader();
                return sink(&mut reader);
            }
            Err(e) => {
                if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                    tracing::warn!(url, attempt = attempt + 1, error = %e, "retrying download");
                    std::thread::sleep(backoff_delay(attempt));
                    continue;
                }
                return Err(ElgaError::HttpError(format!(
                    "Failed to download {}: {}",
                    url, e
                )));
            }
        }
    }

    Err(ElgaError::HttpError(format!(
        "Download of {} failed after retries",
        url
    )))
}
