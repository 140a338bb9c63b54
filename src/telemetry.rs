//! Metrics tracking.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Metrics {
    pub tokens_issued: AtomicU64,
    pub tokens_verified: AtomicU64,
    pub tokens_rejected: AtomicU64,
    pub logins_failed: AtomicU64,
    pub registrations: AtomicU64,
    pub forbidden: AtomicU64,
    pub rate_limited: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_issue(&self) {
        self.tokens_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_verify(&self) {
        self.tokens_verified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reject(&self) {
        self.tokens_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_login_failure(&self) {
        self.logins_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forbidden(&self) {
        self.forbidden.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tokens_issued: self.tokens_issued.load(Ordering::Relaxed),
            tokens_verified: self.tokens_verified.load(Ordering::Relaxed),
            tokens_rejected: self.tokens_rejected.load(Ordering::Relaxed),
            logins_failed: self.logins_failed.load(Ordering::Relaxed),
            registrations: self.registrations.load(Ordering::Relaxed),
            forbidden: self.forbidden.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub tokens_issued: u64,
    pub tokens_verified: u64,
    pub tokens_rejected: u64,
    pub logins_failed: u64,
    pub registrations: u64,
    pub forbidden: u64,
    pub rate_limited: u64,
}
