//! Retry with exponential back-off and jitter for completion calls.
//!
//! Only transient failures are retried. Authentication failures, other 4xx
//! answers and malformed bodies are returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::LlmError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx, HTTP 429.
///
/// **Not retriable:** 401/403 and every other 4xx, undecodable bodies,
/// empty responses, bad base URLs.
pub(crate) fn is_retriable(err: &LlmError) -> bool {
    match err {
        LlmError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        LlmError::Status { status, .. } => *status >= 500,
        LlmError::RateLimited { .. } => true,
        LlmError::Deserialize { .. } | LlmError::EmptyResponse | LlmError::InvalidBaseUrl { .. } => {
            false
        }
    }
}

/// Delay before retry number `attempt` (1-based), before jitter.
///
/// A `Retry-After` hint raises the floor but the result never exceeds 60 s.
fn base_delay_ms(attempt: u32, backoff_base_ms: u64, err: &LlmError) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
    let floor = match err {
        LlmError::RateLimited {
            retry_after_secs: Some(secs),
        } => secs.saturating_mul(1_000),
        _ => 0,
    };
    computed.max(floor).min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Retry | Sleep                       |
/// |-------|-----------------------------|
/// | 1     | 1 000 ms × 2⁰ ± 25 % jitter |
/// | 2     | 1 000 ms × 2¹ ± 25 % jitter |
/// | 3     | 1 000 ms × 2² ± 25 % jitter |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
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
                let capped = base_delay_ms(attempt, backoff_base_ms, &err);
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
                    "transient completion error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn deserialize_err() -> LlmError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        LlmError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    fn status(code: u16) -> LlmError {
        LlmError::Status {
            status: code,
            message: "boom".to_owned(),
        }
    }

    #[test]
    fn server_errors_are_retriable() {
        assert!(is_retriable(&status(500)));
        assert!(is_retriable(&status(503)));
    }

    #[test]
    fn auth_and_client_errors_are_not_retriable() {
        assert!(!is_retriable(&status(401)));
        assert!(!is_retriable(&status(403)));
        assert!(!is_retriable(&status(400)));
    }

    #[test]
    fn rate_limited_is_retriable() {
        assert!(is_retriable(&LlmError::RateLimited {
            retry_after_secs: None
        }));
    }

    #[test]
    fn deserialize_and_empty_are_not_retriable() {
        assert!(!is_retriable(&deserialize_err()));
        assert!(!is_retriable(&LlmError::EmptyResponse));
    }

    #[test]
    fn base_delay_doubles_per_attempt() {
        assert_eq!(base_delay_ms(1, 1_000, &status(500)), 1_000);
        assert_eq!(base_delay_ms(2, 1_000, &status(500)), 2_000);
        assert_eq!(base_delay_ms(3, 1_000, &status(500)), 4_000);
    }

    #[test]
    fn base_delay_is_capped() {
        assert_eq!(base_delay_ms(10, 1_000, &status(500)), MAX_DELAY_MS);
    }

    #[test]
    fn retry_after_raises_the_floor() {
        let err = LlmError::RateLimited {
            retry_after_secs: Some(7),
        };
        assert_eq!(base_delay_ms(1, 1_000, &err), 7_000);
        let huge = LlmError::RateLimited {
            retry_after_secs: Some(3_600),
        };
        assert_eq!(base_delay_ms(1, 1_000, &huge), MAX_DELAY_MS);
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, LlmError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn does_not_retry_auth_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status(401))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "401 must not be retried");
        assert!(matches!(result, Err(LlmError::Status { status: 401, .. })));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err::<u32, _>(status(502))
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99, "should succeed after retries");
        assert_eq!(
            calls.load(Ordering::SeqCst),
            3,
            "should have been called 3 times (2 failures + 1 success)"
        );
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status(503))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(LlmError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(0, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status(500))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }
}
