//! Declarative HTTP retry policy.
//!
//! Wraps any [`Fetcher`] and retries transport failures and selected HTTP
//! statuses with exponential backoff: the n-th retry waits
//! `backoff_factor * 2^(n-1)` seconds, capped at `max_backoff`.

use std::time::Duration;

use crate::error::AppError;
use crate::traits::Fetcher;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub total: u32,
    pub backoff_factor: f64,
    /// HTTP statuses worth retrying.
    pub status_forcelist: Vec<u16>,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            total: 5,
            backoff_factor: 1.0,
            status_forcelist: vec![429, 500, 502, 503, 504],
            max_backoff: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    pub fn with_total(mut self, total: u32) -> Self {
        self.total = total;
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    pub fn should_retry(&self, error: &AppError) -> bool {
        match error.status() {
            Some(status) => self.status_forcelist.contains(&status),
            None => error.is_retryable(),
        }
    }

    /// Sleep before the given retry (1-based). Zero for retry 0.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        if retry == 0 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exp = 2f64.powi(retry.saturating_sub(1).min(30) as i32);
        let secs = self.backoff_factor * exp;
        Duration::from_secs_f64(secs).min(self.max_backoff)
    }
}

/// A [`Fetcher`] that applies a [`RetryPolicy`] to another fetcher.
#[derive(Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let mut retries = 0;
        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if retries < self.policy.total && self.policy.should_retry(&e) => {
                    retries += 1;
                    let wait = self.policy.backoff_for(retries);
                    tracing::warn!(
                        %url,
                        error = %e,
                        retry = retries,
                        wait_ms = %wait.as_millis(),
                        "Retrying request"
                    );
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
