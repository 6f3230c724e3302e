//! Retry with exponential back-off and jitter for model API calls.

use std::future::Future;
use std::time::Duration;

use medintel_core::MAX_RETRY_DELAY_MS;

use crate::error::InsightError;

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// Network timeouts and connect failures, HTTP 429, and HTTP 5xx are
/// transient. Everything else (bad request, bad credential, malformed
/// response) will fail the same way again.
pub(crate) fn is_retriable(err: &InsightError) -> bool {
    match err {
        InsightError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        InsightError::Api { status, .. } => *status == 429 || *status >= 500,
        InsightError::Disabled
        | InsightError::Timeout { .. }
        | InsightError::Deserialize { .. }
        | InsightError::EmptyResponse => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The n-th retry waits `backoff_base_ms × 2^(n-1)` ± 25 % jitter, capped at
/// 10 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, InsightError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, InsightError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_RETRY_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "model API transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
