//! JWT claim set carried by every bearer token.
//! Used by: token::issue, token::verify, auth::gate, handlers::secure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub jti: String,
    pub name: String,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

impl Claims {
    pub fn new(
        username: &str,
        role: Role,
        issuer: &str,
        audience: &str,
        now: DateTime<Utc>,
        lifetime: chrono::Duration,
    ) -> Self {
        Self {
            sub: username.to_owned(),
            jti: uuid::Uuid::new_v4().to_string(),
            name: username.to_owned(),
            role,
            iss: issuer.to_owned(),
            aud: audience.to_owned(),
            iat: now,
            exp: now + lifetime,
        }
    }

    /// Flattened `(type, value)` view, as echoed back by the profile endpoint.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sub", self.sub.clone()),
            ("jti", self.jti.clone()),
            ("name", self.name.clone()),
            ("role", self.role.to_string()),
            ("iss", self.iss.clone()),
            ("aud", self.aud.clone()),
            ("iat", self.iat.timestamp().to_string()),
            ("exp", self.exp.timestamp().to_string()),
        ]
    }
}
