//! Credential store capability and the hardcoded demo implementation.
//! Used by: handlers::auth, state.

use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};
use crate::token::claims::Role;

#[derive(Clone, Default, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credential {
    pub fn new(username: &str, password: &str) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn require_fields(&self) -> Result<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(Error::BadRequest("username and password are required".into()));
        }
        Ok(())
    }
}

/// Backing store for login and registration. A hashed-password store can be
/// swapped in here without touching token issuance or verification.
pub trait CredentialStore: Send + Sync {
    /// Returns the role to issue when the credential is valid.
    fn verify(&self, credential: &Credential) -> Option<Role>;

    fn create(&self, credential: &Credential) -> Result<()>;
}

struct Account {
    username: &'static str,
    password: &'static str,
    role: Role,
}

const DEMO_ACCOUNTS: &[Account] = &[Account {
    username: "admin",
    password: "password",
    role: Role::Admin,
}];

/// Fixed in-binary account table. Registration is accepted and discarded.
pub struct StaticCredentialStore {
    accounts: &'static [Account],
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self { accounts: DEMO_ACCOUNTS }
    }
}

impl Default for StaticCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

fn ct_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

impl CredentialStore for StaticCredentialStore {
    fn verify(&self, credential: &Credential) -> Option<Role> {
        let mut matched = None;
        for account in self.accounts {
            let user_ok = ct_eq(&credential.username, account.username);
            let pass_ok = ct_eq(&credential.password, account.password);
            if user_ok & pass_ok {
                matched = Some(account.role);
            }
        }
        matched
    }

    fn create(&self, credential: &Credential) -> Result<()> {
        credential.require_fields()?;
        tracing::info!(username = %credential.username, "registration accepted (not persisted)");
        Ok(())
    }
}
