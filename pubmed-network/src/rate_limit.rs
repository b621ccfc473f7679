//! Process-wide rate ceiling for E-utilities calls
//!
//! NCBI E-utilities rate limits:
//! - 3 requests per second without API key
//! - 10 requests per second with API key
//! - Violations can result in IP blocking
//!
//! Every outbound request acquires one token from the shared [`RateLimiter`].
//! Callers that find the bucket empty sleep and try again; there is no queue
//! depth limit, so admission delay grows under sustained load.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Rate limiter using a token bucket, shared by cloning
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified rate
    ///
    /// # Arguments
    ///
    /// * `rate` - Maximum requests per second (e.g., 3.0 for NCBI without API key)
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_network::RateLimiter;
    ///
    /// // NCBI rate limit without API key
    /// let limiter = RateLimiter::new(3.0);
    ///
    /// // Clones share the same ceiling
    /// let shared = limiter.clone();
    /// ```
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 {
            rate
        } else {
            1.0
        };
        let capacity = rate.max(1.0);
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket {
                tokens: capacity,
                capacity,
                refill_rate: rate,
                last_refill: Instant::now(),
            })),
        }
    }

    /// Create rate limiter for NCBI API without API key (3 requests/second)
    pub fn ncbi_default() -> Self {
        Self::new(3.0)
    }

    /// Create rate limiter for NCBI API with API key (10 requests/second)
    pub fn ncbi_with_key() -> Self {
        Self::new(10.0)
    }

    /// Acquire a token, waiting until one is available
    ///
    /// The bucket lock is never held across the sleep, so concurrent callers
    /// interleave and each re-checks the bucket after waking.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_network::RateLimiter;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let limiter = RateLimiter::ncbi_default();
    ///
    ///     limiter.acquire().await;
    ///     // Make API call here
    /// }
    /// ```
    #[instrument(skip(self))]
    pub async fn acquire(&self) {
        let mut waited = Duration::ZERO;

        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                bucket.refill();

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    debug!(
                        remaining_tokens = %bucket.tokens,
                        waited_ms = waited.as_millis() as u64,
                        "Token acquired"
                    );
                    return;
                }

                let missing = 1.0 - bucket.tokens;
                Duration::from_secs_f64(missing / bucket.refill_rate)
            };

            debug!(wait_ms = wait.as_millis() as u64, "Sleeping to respect rate limit");
            sleep(wait).await;
            waited += wait;
        }
    }

    /// Check if a token is available without blocking
    ///
    /// This method does not consume a token.
    pub async fn check_available(&self) -> bool {
        let mut bucket = self.bucket.lock().await;
        bucket.refill();
        bucket.tokens >= 1.0
    }

    /// Get current token count (for testing and monitoring)
    pub async fn token_count(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill();
        bucket.tokens
    }

    /// Get the configured rate limit (requests per second)
    pub async fn rate(&self) -> f64 {
        let bucket = self.bucket.lock().await;
        bucket.refill_rate
    }
}

impl TokenBucket {
    /// Refill tokens based on elapsed time
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = elapsed.as_secs_f64() * self.refill_rate;

        self.tokens = (self.tokens + new_tokens).min(self.capacity);
        self.last_refill = now;
    }
}
