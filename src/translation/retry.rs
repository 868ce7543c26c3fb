/*!
 * Bounded retry with exponential backoff for provider conversations.
 */

use log::{debug, warn};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::app_config::TranslationCommonConfig;
use crate::errors::{ProviderError, TranslationError};

/// Retry behavior for one unit conversation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Upper bound of the random delay added to each wait
    pub jitter: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: initial_delay / 4,
        }
    }

    /// Build the policy from the common translation settings.
    ///
    /// `retry_count` counts retries, so one more attempt is allowed.
    pub fn from_config(common: &TranslationCommonConfig) -> Self {
        Self::new(
            common.retry_count.saturating_add(1),
            Duration::from_millis(common.retry_backoff_ms),
        )
        .with_max_delay(Duration::from_millis(common.max_retry_delay_ms))
    }

    /// Set the maximum delay between retries
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the jitter bound
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Policy without waits
    #[cfg(test)]
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO).with_jitter(Duration::ZERO)
    }

    /// Delay before a given attempt (0-indexed), jitter excluded
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if delay.is_zero() || jitter_ms == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TranslationCommonConfig::default())
    }
}

/// Whether another attempt can help.
fn is_transient(error: &ProviderError) -> bool {
    !matches!(error, ProviderError::AuthenticationError(_))
}

/// Run an async operation under the policy.
///
/// Returns `TranslationError::Unreachable` once the attempts are spent or on a
/// failure that retrying cannot fix.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, TranslationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 0..max_attempts {
        let delay = policy.jittered(policy.delay_for_attempt(attempt));
        if !delay.is_zero() {
            debug!(
                "{}: Retry attempt {}/{} after {:?}",
                operation_name,
                attempt + 1,
                max_attempts,
                delay
            );
            sleep(delay).await;
        }

        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{}: Succeeded on attempt {}/{}", operation_name, attempt + 1, max_attempts);
                }
                return Ok(result);
            }
            Err(e) => {
                let remaining = max_attempts - attempt - 1;
                if remaining > 0 && is_transient(&e) {
                    warn!(
                        "{}: Attempt {}/{} failed ({}), {} retries remaining",
                        operation_name,
                        attempt + 1,
                        max_attempts,
                        e,
                        remaining
                    );
                    last_error = e.to_string();
                    continue;
                }

                warn!("{}: Giving up after {} attempts. Last error: {}", operation_name, attempt + 1, e);
                return Err(TranslationError::Unreachable {
                    attempts: attempt + 1,
                    last_error: e.to_string(),
                });
            }
        }
    }

    Err(TranslationError::Unreachable {
        attempts: max_attempts,
        last_error,
    })
}
