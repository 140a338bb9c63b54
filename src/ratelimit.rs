//! Login throttling: a global request rate plus failed attempts per client IP.
//! Only failures count against an IP, so a correct login is never spent on the
//! budget, and nothing is keyed on the submitted username.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<RateLimitState>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub global_per_sec: u32,
    pub failures_per_ip_per_min: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_sec: 1000,
            failures_per_ip_per_min: 20,
        }
    }
}

struct RateLimitState {
    ip_failures: HashMap<Box<str>, WindowCounter>,
    global_count: WindowCounter,
    last_cleanup: Instant,
}

struct WindowCounter {
    count: u32,
    window_start: Instant,
}

impl WindowCounter {
    fn new() -> Self {
        Self { count: 0, window_start: Instant::now() }
    }

    fn roll(&mut self, window: Duration) {
        let now = Instant::now();
        if now.duration_since(self.window_start) > window {
            self.count = 0;
            self.window_start = now;
        }
    }

    fn increment(&mut self, limit: u32, window: Duration) -> bool {
        self.roll(window);
        self.count = self.count.saturating_add(1);
        self.count <= limit
    }

    fn exhausted(&mut self, limit: u32, window: Duration) -> bool {
        self.roll(window);
        self.count >= limit
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(RateLimitState {
                ip_failures: HashMap::new(),
                global_count: WindowCounter::new(),
                last_cleanup: Instant::now(),
            }),
        }
    }

    // Counters stay usable after a panic elsewhere; worst case is a stale count.
    fn lock(&self) -> MutexGuard<'_, RateLimitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs before credentials are checked. `ip` is `None` when the peer
    /// address is unknown, in which case only the global rate applies.
    pub fn check(&self, ip: Option<&str>) -> Result<(), RateLimitError> {
        let mut state = self.lock();
        self.maybe_cleanup(&mut state);

        if !state.global_count.increment(self.config.global_per_sec, Duration::from_secs(1)) {
            return Err(RateLimitError::Global);
        }

        let Some(ip) = ip else {
            return Ok(());
        };

        let limit = self.config.failures_per_ip_per_min;
        let blocked = state
            .ip_failures
            .get_mut(ip)
            .is_some_and(|counter| counter.exhausted(limit, WINDOW));

        if blocked {
            return Err(RateLimitError::PerIp {
                limit,
                window_secs: WINDOW.as_secs(),
            });
        }

        Ok(())
    }

    /// Charges a failed login to `ip`.
    pub fn record_failure(&self, ip: Option<&str>) {
        let Some(ip) = ip else {
            return;
        };
        let mut state = self.lock();
        state
            .ip_failures
            .entry(ip.into())
            .or_insert_with(WindowCounter::new)
            .increment(self.config.failures_per_ip_per_min, WINDOW);
    }

    fn maybe_cleanup(&self, state: &mut RateLimitState) {
        let now = Instant::now();
        if now.duration_since(state.last_cleanup) > CLEANUP_INTERVAL {
            let cutoff = now - WINDOW - Duration::from_secs(60);
            state.ip_failures.retain(|_, c| c.window_start > cutoff);
            state.last_cleanup = now;
        }
    }

    #[cfg(test)]
    fn tracked_ips(&self) -> usize {
        self.lock().ip_failures.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("global rate limit exceeded")]
    Global,

    #[error("rate limit: {limit} failed logins per {window_secs}s")]
    PerIp { limit: u32, window_secs: u64 },
}
