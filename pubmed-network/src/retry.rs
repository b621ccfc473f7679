//! Retry policy shared by every outbound E-utilities call
//!
//! One [`RetryPolicy`] value carries the attempt budget, the backoff schedule
//! and the per-request timeout. The loop itself is driven by `tokio-retry`;
//! this module only decides which errors are transient and how long to wait.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

/// Errors that can tell whether repeating the request may succeed
pub trait RetryableError {
    /// Whether the failure is transient (timeouts, 5xx, 429, ...)
    fn is_retryable(&self) -> bool;

    /// Short human readable classification, used in logs
    fn retry_reason(&self) -> &str;
}

/// Attempt budget, backoff schedule and timeout for outbound calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
    /// Randomize each delay into `[delay / 2, delay]`
    pub jitter: bool,
    /// Timeout applied to every individual HTTP request
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: true,
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that performs exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts, including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delays to wait before each retry, in order
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use pubmed_network::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default().with_jitter(false);
    /// let delays = policy.schedule();
    /// assert_eq!(delays[0], Duration::from_millis(500));
    /// assert_eq!(delays[1], Duration::from_millis(1000));
    /// ```
    pub fn schedule(&self) -> Vec<Duration> {
        let mut rng = rand::thread_rng();
        let mut current = self.initial_delay.as_secs_f64();
        let cap = self.max_delay.as_secs_f64();

        (0..self.max_retries)
            .map(|_| {
                let base = current.min(cap);
                current *= self.multiplier.max(1.0);
                let secs = if self.jitter {
                    base * rng.gen_range(0.5..=1.0)
                } else {
                    base
                };
                Duration::from_secs_f64(secs)
            })
            .collect()
    }
}

/// Run `operation` until it succeeds, fails permanently, or the policy runs out
///
/// The last error is returned unchanged; callers that need to distinguish an
/// exhausted budget check `is_retryable()` on it.
pub async fn with_retry<T, E, F, Fut>(
    operation: F,
    policy: &RetryPolicy,
    label: &str,
) -> Result<T, E>
where
    E: RetryableError + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1u32;
    let max_attempts = policy.max_attempts();

    RetryIf::spawn(policy.schedule(), operation, |err: &E| {
        if !err.is_retryable() {
            debug!(operation = label, reason = err.retry_reason(), "Not retrying");
            return false;
        }
        warn!(
            operation = label,
            attempt,
            max_attempts,
            reason = err.retry_reason(),
            error = %err,
            "Transient failure, retrying"
        );
        attempt += 1;
        true
    })
    .await
}
