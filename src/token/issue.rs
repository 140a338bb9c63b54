//! HS256 token issuance.
//! Used by: handlers::auth, state.

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::config::JwtSettings;
use crate::error::Result;
use crate::token::claims::{Claims, Role};

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.exp
    }
}

pub struct TokenIssuer {
    key: EncodingKey,
    issuer: String,
    audience: String,
    lifetime: chrono::Duration,
}

impl TokenIssuer {
    /// Settings are expected to have passed `JwtSettings::validate`.
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            key: EncodingKey::from_secret(settings.secret_key.as_bytes()),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            lifetime: settings.lifetime(),
        }
    }

    /// Caller must already have authenticated `username`.
    pub fn issue(&self, username: &str, role: Role) -> Result<IssuedToken> {
        self.issue_at(username, role, Utc::now())
    }

    pub fn issue_at(&self, username: &str, role: Role, now: DateTime<Utc>) -> Result<IssuedToken> {
        let claims = Claims::new(username, role, &self.issuer, &self.audience, now, self.lifetime);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)?;
        tracing::debug!(sub = %claims.sub, jti = %claims.jti, role = %claims.role, "token issued");
        Ok(IssuedToken { token, claims })
    }
}
