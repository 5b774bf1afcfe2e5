//! In-process login rate limiter
//!
//! Keeps the timestamps of recent attempts per client key. Attempts older
//! than the window are dropped on every check; once `limit` attempts remain
//! inside the window further attempts are rejected until the oldest expires.
//! State is not persisted and not shared between processes.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Attempt rejected; retry after the given delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub retry_after: Duration,
}

/// Sliding-window attempt counter keyed by client
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    attempts: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `key`, or reject it if the key is over its limit.
    pub fn check(&self, key: &str) -> Result<(), RateLimited> {
        self.check_at(key, Instant::now())
    }

    pub(crate) fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimited> {
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);

        let window = self.window;
        attempts.retain(|_, times| {
            while times
                .front()
                .is_some_and(|t| now.saturating_duration_since(*t) >= window)
            {
                times.pop_front();
            }
            !times.is_empty()
        });

        let times = attempts.entry(key.to_owned()).or_default();
        if times.len() >= self.limit {
            let oldest = times.front().copied().unwrap_or(now);
            let retry_after = window.saturating_sub(now.saturating_duration_since(oldest));
            return Err(RateLimited { retry_after });
        }

        times.push_back(now);
        Ok(())
    }

    /// Number of clients with attempts inside the current window.
    pub fn tracked_keys(&self) -> usize {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
