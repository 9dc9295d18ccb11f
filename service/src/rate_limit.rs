//! Fixed-window request rate limiting keyed by client address.

use dashmap::DashMap;
use log::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Decides whether a request identified by `key` may proceed.
///
/// Implemented in-process by `FixedWindowRateLimiter`; a distributed limiter can be
/// swapped in without touching the request handlers.
pub trait RateLimiter: Send + Sync {
    fn allow(&self, key: &str) -> bool;

    /// Drop state that can no longer affect a decision. Returns how many entries were removed.
    fn sweep(&self) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// Allows at most `max_requests` per key in each window of length `window`.
///
/// At most `capacity` keys are tracked. A new key arriving while the map is full
/// triggers a sweep; if the map is still full the request is denied.
pub struct FixedWindowRateLimiter {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window: Duration,
    capacity: usize,
}

impl FixedWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration, capacity: usize) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        if !self.windows.contains_key(key) && self.windows.len() >= self.capacity {
            self.sweep_at(now);
            if self.windows.len() >= self.capacity {
                warn!(
                    "Rate limiter is tracking {} clients, denying new client",
                    self.windows.len()
                );
                return false;
            }
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            return false;
        }

        entry.count += 1;
        true
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started_at) < self.window);
        before.saturating_sub(self.windows.len())
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }
}

/// Periodically sweeps `limiter` on the current tokio runtime.
pub fn spawn_sweeper(
    limiter: Arc<dyn RateLimiter>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        // tokio rejects a zero period
        let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            let removed = limiter.sweep();
            if removed > 0 {
                debug!("Swept {removed} expired rate limiting windows");
            }
        }
    })
}
