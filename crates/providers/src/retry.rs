//! Bounded retry with exponential backoff for provider calls.
//!
//! Transient provider failures (network errors, rate limiting, 5xx-class
//! responses) are retried here, at the provider boundary. Pipeline code
//! never retries.

use std::future::Future;
use std::time::Duration;

use docsqa_core::AppResult;

/// Maximum attempts per provider call.
pub const MAX_ATTEMPTS: u32 = 3;

/// Initial backoff duration in milliseconds; doubles per attempt.
pub const INITIAL_BACKOFF_MS: u64 = 100;

/// Run `op` up to [`MAX_ATTEMPTS`] times with exponential backoff between
/// attempts, returning the first success or the last error.
pub async fn with_retry<T, F, Fut>(op_name: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut backoff_ms = INITIAL_BACKOFF_MS;
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying in {}ms: {}",
                    op_name,
                    attempt,
                    MAX_ATTEMPTS,
                    backoff_ms,
                    err
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!("{} failed after {} attempts: {}", op_name, attempt, err);
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsqa_core::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let calls = AtomicU32::new(0);
        let result: AppResult<u32> = with_retry("op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result: AppResult<u32> = with_retry("op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(AppError::Model("transient".to_string()))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempts() {
        let calls = AtomicU32::new(0);
        let result: AppResult<u32> = with_retry("op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::Model("down".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }
}
