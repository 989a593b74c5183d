//! Retry helpers shared by the pipeline stages.

use std::time::Duration;

/// Check if a status code is worth retrying the outer exchange for.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Exponential backoff delay for the given attempt.
pub fn exponential_backoff(attempt: u32, base_ms: u64) -> Duration {
    let delay_ms = base_ms.saturating_mul(2_u64.saturating_pow(attempt.min(10)));
    Duration::from_millis(delay_ms)
}
