//! Shared application state.

use std::sync::Arc;

use crate::auth::credentials::{CredentialStore, StaticCredentialStore};
use crate::config::{Config, JwtSettings};
use crate::error::Result;
use crate::ratelimit::{RateLimitConfig, RateLimiter};
use crate::telemetry::Metrics;
use crate::token::issue::TokenIssuer;
use crate::token::verify::TokenVerifier;

pub struct AppStateInner {
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
    pub credentials: Box<dyn CredentialStore>,
    pub metrics: Metrics,
    pub rate_limiter: RateLimiter,
}

pub type AppState = Arc<AppStateInner>;

struct StateBuilder {
    jwt: JwtSettings,
    credentials: Box<dyn CredentialStore>,
    rate_limits: RateLimitConfig,
}

impl StateBuilder {
    fn build(self) -> Result<AppState> {
        self.jwt.validate()?;

        Ok(Arc::new(AppStateInner {
            issuer: TokenIssuer::new(&self.jwt),
            verifier: TokenVerifier::new(&self.jwt),
            credentials: self.credentials,
            metrics: Metrics::new(),
            rate_limiter: RateLimiter::new(self.rate_limits),
        }))
    }
}

pub fn build_state(config: &Config) -> Result<AppState> {
    StateBuilder {
        jwt: config.jwt.clone(),
        credentials: Box::new(StaticCredentialStore::new()),
        rate_limits: RateLimitConfig::default(),
    }
    .build()
}

#[cfg(test)]
pub fn build_test_state() -> Result<AppState> {
    build_test_state_with(JwtSettings::default(), RateLimitConfig::default())
}

#[cfg(test)]
pub fn build_test_state_with(jwt: JwtSettings, rate_limits: RateLimitConfig) -> Result<AppState> {
    StateBuilder {
        jwt,
        credentials: Box::new(StaticCredentialStore::new()),
        rate_limits,
    }
    .build()
}
