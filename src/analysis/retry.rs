use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Retry `operation` on failure with exponential backoff and jitter.
///
/// The operation always runs at least once. After a failed attempt `n`
/// (1-based) the delay is `base_delay * 2^(n-1)` plus up to one second of
/// jitter; after `max_retries` failures the last error is returned.
pub async fn retry_with_backoff<T, F, Fut>(
    mut operation: F,
    max_retries: u32,
    base_delay: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= max_retries {
                    return Err(e);
                }
                let delay = base_delay * 2u32.pow(attempt - 1)
                    + Duration::from_millis(rand::random_range(0..1000));
                log::warn!(
                    "Attempt {attempt}/{max_retries} failed: {e}. Retrying in {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    // Small base delay keeps the jitter the dominant cost; worst case a
    // couple of seconds of real sleeping.
    const BASE: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_succeeds_on_third_attempt_without_fourth_call() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(Error::Analysis(format!("transient failure {n}")))
                    } else {
                        Ok(42)
                    }
                }
            },
            3,
            BASE,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_return_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err(Error::Analysis(format!("failure {n}"))) }
            },
            3,
            BASE,
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Analysis error: failure 3");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_immediate_success_runs_once() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("done") }
            },
            3,
            BASE,
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
