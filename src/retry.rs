/// Retry policy for RPC calls prone to rate limiting
///
/// The policy lives in the transport layer: the registry and version manager
/// above it never retry, they only see the final outcome of a call.
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use tokio::time::{Duration, sleep};

/// Configuration for retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries in the fast exponential backoff phase
    pub max_retries: u32,

    /// Initial delay in milliseconds before the first retry
    pub initial_delay_ms: u64,

    /// Multiplier for exponential backoff
    /// Each retry delay = initial_delay_ms * backoff_multiplier^retry_count
    pub backoff_multiplier: u64,

    /// Number of extended waits after the fast phase is exhausted
    ///
    /// Each extended wait resets the fast phase. Once these are used up the
    /// last error is returned to the caller.
    #[serde(default)]
    pub extended_retries: u32,

    /// Wait time in seconds before each extended retry round
    pub extended_retry_wait_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 100,
            backoff_multiplier: 4,
            extended_retries: 1,
            extended_retry_wait_seconds: 30,
        }
    }
}

/// Whether an error message looks like a provider rate limit
pub fn is_rate_limited(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    message.contains("429") || lower.contains("too many requests") || lower.contains("rate limit")
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(
        max_retries: u32,
        initial_delay_ms: u64,
        backoff_multiplier: u64,
        extended_retries: u32,
        extended_retry_wait_seconds: u64,
    ) -> Self {
        Self {
            max_retries,
            initial_delay_ms,
            backoff_multiplier,
            extended_retries,
            extended_retry_wait_seconds,
        }
    }

    /// Delay before fast retry number `attempt` (zero-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.saturating_pow(attempt);
        Duration::from_millis(self.initial_delay_ms.saturating_mul(factor))
    }

    /// Execute an operation, retrying only rate-limit errors
    ///
    /// Non-rate-limit errors are returned immediately.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = RetryConfig::default();
    /// let address = config.execute(|| async {
    ///     storage.getAddress(key).call().await
    /// }).await?;
    /// ```
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.execute_with_predicate(operation, |e: &E| is_rate_limited(&e.to_string()))
            .await
    }

    /// Execute an operation with a custom retryable-error predicate
    ///
    /// **Phase 1:** up to `max_retries` retries with exponential backoff.
    /// **Phase 2:** up to `extended_retries` long waits, each followed by a
    /// fresh phase 1. After that the last error is returned.
    pub async fn execute_with_predicate<F, Fut, T, E, P>(
        &self,
        mut operation: F,
        is_retryable: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut extended_retry_count = 0;

        loop {
            let mut retries = 0;

            loop {
                let e = match operation().await {
                    Ok(result) => return Ok(result),
                    Err(e) => e,
                };

                if !is_retryable(&e) {
                    return Err(e);
                }

                if retries < self.max_retries {
                    let delay = self.backoff_delay(retries);
                    let now = chrono::Local::now().format("%H:%M:%S");
                    tracing::debug!(
                        "[{}] Retryable error, retrying after {}ms (attempt {}/{}): {}",
                        now,
                        delay.as_millis(),
                        retries + 1,
                        self.max_retries,
                        e
                    );

                    sleep(delay).await;
                    retries += 1;
                    continue;
                }

                if extended_retry_count >= self.extended_retries {
                    tracing::warn!(
                        "Giving up after {} retries and {} extended waits: {}",
                        self.max_retries,
                        extended_retry_count,
                        e
                    );
                    return Err(e);
                }

                extended_retry_count += 1;
                let now = chrono::Local::now().format("%H:%M:%S");
                tracing::warn!(
                    "[{}] Max retries ({}) exhausted. Waiting {} seconds before retry #{} (extended mode)",
                    now,
                    self.max_retries,
                    self.extended_retry_wait_seconds,
                    extended_retry_count
                );

                sleep(Duration::from_secs(self.extended_retry_wait_seconds)).await;
                break;
            }
        }
    }
}
