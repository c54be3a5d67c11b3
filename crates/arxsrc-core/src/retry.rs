//! Retry with exponential backoff for HTTP calls

use std::time::Duration;

use crate::http::{HttpError, http_config};

/// Exponential backoff: 2^attempt seconds (2s, 4s, 8s, ...)
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt))
}

/// Retry a fallible request with exponential backoff.
///
/// Retries retryable errors up to `max_retries` (from the global
/// [`HttpConfig`](crate::HttpConfig)). Returns the first success, or the
/// last error on exhaustion / non-retryable error.
pub fn retry_with_backoff<T>(
    label: &str,
    attempt_fn: impl FnMut() -> Result<T, HttpError>,
) -> Result<T, HttpError> {
    retry_with(label, http_config().max_retries, backoff_duration, attempt_fn)
}

fn retry_with<T>(
    label: &str,
    max_retries: u32,
    delay: impl Fn(u32) -> Duration,
    mut attempt_fn: impl FnMut() -> Result<T, HttpError>,
) -> Result<T, HttpError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                let wait = delay(attempt);
                log::warn!("{label}: {e}, retry {attempt}/{max_retries} in {wait:?}");
                std::thread::sleep(wait);
            }
            Err(e) => {
                log::debug!("{label}: giving up: {e}");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_exponential() {
        assert_eq!(backoff_duration(1), Duration::from_secs(2));
        assert_eq!(backoff_duration(2), Duration::from_secs(4));
        assert_eq!(backoff_duration(3), Duration::from_secs(8));
    }

    #[test]
    fn retries_transient_then_succeeds() {
        let mut calls = 0;
        let result = retry_with("test", 3, |_| Duration::ZERO, || {
            calls += 1;
            if calls < 3 {
                Err(HttpError::Status {
                    status: 503,
                    message: "busy".into(),
                })
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn stops_on_non_retryable() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with("test", 3, |_| Duration::ZERO, || {
            calls += 1;
            Err(HttpError::Status {
                status: 404,
                message: "missing".into(),
            })
        });
        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(calls, 1);
    }

    #[test]
    fn gives_up_after_max_retries() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with("test", 2, |_| Duration::ZERO, || {
            calls += 1;
            Err(HttpError::Transport("reset".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }
}
