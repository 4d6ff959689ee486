// src/sources/mod.rs
//! Independently fetched inputs of the dashboard view

pub mod listing_source;
pub mod overlay_source;

pub use listing_source::ListingSource;
pub use overlay_source::{OverlaySource, SavedCheck};

use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::core::ApiConfig;
use crate::error::FetchError;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        }
    }

    fn delay_for(&self, attempt: u32, err: &FetchError) -> Duration {
        match err {
            FetchError::RateLimited {
                retry_after_secs: Some(secs),
            } => Duration::from_secs(*secs),
            _ => self
                .backoff
                .checked_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
                .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY)),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

/// Run a read-only fetch, retrying transient failures with exponential backoff
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt, &err);
                warn!(
                    "Fetching {} failed ({}), retry {}/{} in {:?}",
                    what, err, attempt, policy.max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Unwrap a collection payload: a bare array, or an object holding it under
/// one of the usual envelope keys
pub fn collection_items<'a>(payload: &'a Value, what: &str) -> Result<&'a [Value], FetchError> {
    if let Some(items) = payload.as_array() {
        return Ok(items);
    }

    ["jobs", "data", "results", "saved_jobs", "applications"]
        .iter()
        .find_map(|key| payload.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .ok_or_else(|| FetchError::malformed(format!("Expected a list of {}", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_collection_envelopes() {
        assert_eq!(collection_items(&json!([1, 2]), "jobs").unwrap().len(), 2);
        assert_eq!(
            collection_items(&json!({"data": [1]}), "jobs").unwrap().len(),
            1
        );
        assert!(collection_items(&json!({"message": "ok"}), "jobs").is_err());
    }

    #[test]
    fn test_backoff_doubles_and_is_capped() {
        let policy = RetryPolicy {
            max_retries: 40,
            backoff: Duration::from_millis(250),
        };
        let err = FetchError::Network {
            message: "reset".into(),
        };
        assert_eq!(policy.delay_for(1, &err), Duration::from_millis(250));
        assert_eq!(policy.delay_for(3, &err), Duration::from_secs(1));
        assert_eq!(policy.delay_for(40, &err), MAX_RETRY_DELAY);

        let huge = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_secs(u64::MAX),
        };
        assert_eq!(huge.delay_for(3, &err), MAX_RETRY_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_then_succeeds() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            max_retries: 2,
            backoff: Duration::from_millis(100),
        };
        let result = with_retry(policy, "listings", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(FetchError::Network {
                    message: "reset".into(),
                })
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_auth() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(RetryPolicy::default(), "saved", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::auth_required("no token"))
        })
        .await;
        assert!(matches!(result, Err(FetchError::AuthRequired { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
