//! Exponential-backoff retry policy shared by transcription adapters.

use crate::error::SubSyncError;
use std::future::Future;
use std::time::Duration;

/// Retry configuration: up to `max_attempts` tries with exponential
/// backoff starting at `base_delay` plus jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

/// Run `operation` with exponential backoff. Retries only on
/// [`SubSyncError::RetryableApiError`]; any other error (including
/// `AuthError`/`QuotaExceeded`) is returned immediately.
pub async fn retry_with_backoff<F, Fut, T>(config: RetryConfig, mut operation: F) -> Result<T, SubSyncError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SubSyncError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(SubSyncError::RetryableApiError(msg)) if attempt < config.max_attempts => {
                let backoff = config.base_delay * 2u32.pow(attempt - 1);
                let jitter = Duration::from_millis(fastrand_jitter_ms());
                log::warn!(
                    "transcription attempt {attempt}/{} failed ({msg}), retrying in {:?}",
                    config.max_attempts,
                    backoff + jitter
                );
                tokio::time::sleep(backoff + jitter).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Small deterministic-ish jitter source without pulling in a `rand`
/// dependency: derived from the current instant's sub-millisecond part.
fn fastrand_jitter_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_millis() as u64 % 250)
        .unwrap_or(0)
}
