//! Retry helpers for fallible async operations.

use log::*;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Calls `operation` until it succeeds or `attempts` calls have failed.
///
/// Returns the first success, or the error of the last attempt. An
/// `attempts` of zero still performs one call.
pub async fn with_attempts<F, Fut, T, E>(attempts: u32, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                error!("Attempt {attempt}/{attempts} failed, giving up: {e}");
                return Err(e);
            }
            Err(e) => {
                warn!("Attempt {attempt}/{attempts} failed: {e}");
                attempt += 1;
            }
        }
    }
}

/// Exponential backoff shared by successive calls.
///
/// Each failed [`Backoff::run`] sleeps for the current delay before returning
/// the error, then doubles the delay up to `max`. A success resets the delay
/// to `base` and returns without sleeping.
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Mutex<Duration>,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            current: Mutex::new(base),
        }
    }

    /// The delay the next failure will sleep for.
    pub fn current_delay(&self) -> Duration {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn run<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match operation().await {
            Ok(value) => {
                self.reset();
                Ok(value)
            }
            Err(e) => {
                let delay = self.advance();
                debug!("Backing off for {delay:?}");
                tokio::time::sleep(delay).await;
                Err(e)
            }
        }
    }

    fn reset(&self) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = self.base;
    }

    /// Returns the delay to sleep now and doubles the stored one.
    fn advance(&self) -> Duration {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let delay = *current;
        *current = delay.saturating_mul(2).min(self.max);
        delay
    }
}
