//! Credential verification policies.
//!
//! `CredentialScheme` is the capability seam between the session/registration
//! services and whatever actually checks a password. Two implementations
//! exist: the fixed demo-account table the platform currently ships with, and
//! a bcrypt salted-hash scheme for production deployments.

use async_trait::async_trait;
use bcrypt::DEFAULT_COST;
use secrecy::{ExposeSecret, Secret};
use std::fmt;

use crate::core::errors::AuthError;

/// Plaintext password with memory protection.
///
/// Wraps `secrecy::Secret` so the value cannot leak through `Debug` or
/// `Display` on its way from the API boundary to the scheme.
pub struct Password(Secret<String>);

impl Password {
    pub fn new(password: &str) -> Self {
        Self(Secret::new(password.to_string()))
    }

    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password").field("value", &"<REDACTED>").finish()
    }
}

pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Bcrypt truncates beyond 72 bytes, so longer inputs are rejected outright.
pub const MAX_PASSWORD_LENGTH: usize = 72;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "12345678", "qwertyui", "letmein1", "iloveyou", "trustno1",
    "passw0rd", "sunshine", "princess", "football", "baseball", "superman",
];

/// Strict registration-time password policy, enforced by the production
/// scheme. Never applied on login, so accounts predating a policy change can
/// still authenticate.
pub fn validate_password(password: &Password) -> Result<(), AuthError> {
    let raw = password.expose_secret();
    if raw.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if raw.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "must be at most {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    if COMMON_PASSWORDS.contains(&raw.to_lowercase().as_str()) {
        return Err(AuthError::WeakPassword("too common".to_string()));
    }
    Ok(())
}

/// Capability interface for producing and checking stored credential material.
#[async_trait]
pub trait CredentialScheme: Send + Sync {
    /// Registration-time acceptance policy for a new credential. Each scheme
    /// decides its own bar: the demo scheme takes any non-empty password,
    /// bcrypt enforces the strict policy.
    fn validate(&self, password: &Password) -> Result<(), AuthError>;

    /// Produce the stored form of a new account's credential.
    async fn hash(&self, password: &Password) -> Result<String, AuthError>;

    /// Check a presented password for `email` against the stored material.
    /// Returns `Ok(false)` on mismatch; `Err` only for internal failures.
    async fn verify(
        &self,
        email: &str,
        password: &Password,
        stored: &str,
    ) -> Result<bool, AuthError>;
}

/// Demo policy: a small fixed table of email/password pairs, plaintext
/// storage for anything registered at runtime. A deliberate placeholder for
/// demo deployments only.
pub struct DemoCredentials {
    table: Vec<(&'static str, &'static str)>,
}

impl DemoCredentials {
    pub fn new() -> Self {
        Self {
            table: vec![
                ("admin@legalplatform.com", "admin123"),
                ("practitioner@legalplatform.com", "practitioner123"),
                ("assistant@legalplatform.com", "assistant123"),
            ],
        }
    }
}

impl Default for DemoCredentials {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialScheme for DemoCredentials {
    fn validate(&self, password: &Password) -> Result<(), AuthError> {
        if password.expose_secret().is_empty() {
            return Err(AuthError::WeakPassword("must not be empty".to_string()));
        }
        Ok(())
    }

    async fn hash(&self, password: &Password) -> Result<String, AuthError> {
        // Plaintext storage, same as the demo table itself.
        Ok(password.expose_secret().to_string())
    }

    async fn verify(
        &self,
        email: &str,
        password: &Password,
        stored: &str,
    ) -> Result<bool, AuthError> {
        let expected = self
            .table
            .iter()
            .find(|(table_email, _)| *table_email == email)
            .map(|(_, table_password)| *table_password)
            .unwrap_or(stored);
        Ok(expected == password.expose_secret())
    }
}

/// Production policy: bcrypt salted hashes stored on the user record.
///
/// Hashing and verification are CPU-bound, so both run on the blocking
/// thread pool instead of stalling the async runtime.
pub struct BcryptCredentials {
    cost: u32,
}

impl BcryptCredentials {
    pub fn new(cost: Option<u32>) -> Self {
        Self {
            cost: cost.unwrap_or(DEFAULT_COST),
        }
    }
}

#[async_trait]
impl CredentialScheme for BcryptCredentials {
    fn validate(&self, password: &Password) -> Result<(), AuthError> {
        validate_password(password)
    }

    async fn hash(&self, password: &Password) -> Result<String, AuthError> {
        let password = password.expose_secret().to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || {
            bcrypt::hash(password, cost).map_err(|e| AuthError::HashingError(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::HashingError(format!("Join error: {}", e)))?
    }

    async fn verify(
        &self,
        _email: &str,
        password: &Password,
        stored: &str,
    ) -> Result<bool, AuthError> {
        let password = password.expose_secret().to_string();
        let stored = stored.to_string();
        tokio::task::spawn_blocking(move || {
            bcrypt::verify(password, &stored).map_err(|e| AuthError::HashingError(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::HashingError(format!("Join error: {}", e)))?
    }
}
