//! Process configuration, read once from the environment at startup.
//! Used by: main, state.

use crate::error::{Error, Result};

const DEFAULT_SECRET_KEY: &str = "VotreCleSecreteTresLongueEtSecurisee123456!";
const DEFAULT_ISSUER: &str = "JwtAuthApi";
const DEFAULT_AUDIENCE: &str = "JwtAuthApiClients";
const DEFAULT_EXPIRATION_MINUTES: i64 = 60;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const MAX_EXPIRATION_MINUTES: i64 = 60 * 24 * 365;

/// HS256 keys shorter than the hash output are rejected.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct JwtSettings {
    pub secret_key: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_minutes: i64,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret_key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiration_minutes", &self.expiration_minutes)
            .finish()
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.into(),
            issuer: DEFAULT_ISSUER.into(),
            audience: DEFAULT_AUDIENCE.into(),
            expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
        }
    }
}

impl JwtSettings {
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(Error::Config("JWT_SECRET_KEY is empty".into()));
        }
        if self.secret_key.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "JWT_SECRET_KEY must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                self.secret_key.len()
            )));
        }
        if self.issuer.is_empty() || self.audience.is_empty() {
            return Err(Error::Config("issuer and audience must be non-empty".into()));
        }
        if !(1..=MAX_EXPIRATION_MINUTES).contains(&self.expiration_minutes) {
            return Err(Error::Config(format!(
                "JWT_EXPIRATION_MINUTES must be between 1 and {}",
                MAX_EXPIRATION_MINUTES
            )));
        }
        Ok(())
    }

    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.expiration_minutes)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub jwt: JwtSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset keys fall back to
    /// the built-in defaults; the result is validated before it is returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = JwtSettings::default();

        let expiration_minutes = match lookup("JWT_EXPIRATION_MINUTES") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                Error::Config(format!("JWT_EXPIRATION_MINUTES is not an integer: {raw:?}"))
            })?,
            None => defaults.expiration_minutes,
        };

        let jwt = JwtSettings {
            secret_key: lookup("JWT_SECRET_KEY").unwrap_or(defaults.secret_key),
            issuer: lookup("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: lookup("JWT_AUDIENCE").unwrap_or(defaults.audience),
            expiration_minutes,
        };
        jwt.validate()?;

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            jwt,
        })
    }
}
