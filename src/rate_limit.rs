//! Token bucket limiter and the rate-limited request gate used for GitHub.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Request, Response};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// GitHub allows 30 authenticated search requests per minute.
pub const GITHUB_REFILL_INTERVAL: Duration = Duration::from_secs(2);
pub const GITHUB_BURST: u32 = 10;

/// A token bucket: `burst` permits at most, one permit added every `interval`.
#[derive(Debug)]
pub struct TokenBucket {
    tokens: f64,
    max_tokens: f64,
    /// Tokens added per second.
    refill_rate: f64,
    last_update: Instant,
}

impl TokenBucket {
    pub fn new(interval: Duration, burst: u32) -> Self {
        let max_tokens = f64::from(burst.max(1));
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate: 1.0 / interval.as_secs_f64().max(f64::EPSILON),
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_update = now;
    }

    /// Takes a token if one is available, otherwise returns how long until one is.
    pub fn try_acquire(&mut self) -> Option<Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let wait_secs = (1.0 - self.tokens) / self.refill_rate;
            Some(Duration::from_secs_f64(wait_secs))
        }
    }

    pub fn available(&mut self) -> u32 {
        self.refill();
        self.tokens.floor() as u32
    }
}

/// Cloneable handle to one bucket, safe to acquire from several tasks.
#[derive(Debug, Clone)]
pub struct SharedRateLimiter {
    inner: Arc<Mutex<TokenBucket>>,
}

impl SharedRateLimiter {
    pub fn new(interval: Duration, burst: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TokenBucket::new(interval, burst))),
        }
    }

    /// Waits until a token is available and takes it. Dropping the future cancels
    /// the wait without consuming a token.
    pub async fn acquire(&self) {
        loop {
            let wait = self.inner.lock().await.try_acquire();
            match wait {
                None => return,
                Some(wait) => {
                    debug!("Rate limiter waiting {:?} for token", wait);
                    sleep(wait).await;
                }
            }
        }
    }

    pub async fn available(&self) -> u32 {
        self.inner.lock().await.available()
    }
}

/// HTTP client whose requests each take a token from a shared bucket first.
#[derive(Debug, Clone)]
pub struct RateLimitedClient {
    client: Client,
    limiter: SharedRateLimiter,
}

impl RateLimitedClient {
    pub fn new(client: Client, limiter: SharedRateLimiter) -> Self {
        Self { client, limiter }
    }

    /// Underlying client, for building requests.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
        self.limiter.acquire().await;
        self.client.execute(request).await
    }
}
