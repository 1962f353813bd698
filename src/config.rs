use crate::core::errors::AuthError;
use serde::{Deserialize, Serialize};
use std::env;

/// Which credential-verification policy the platform runs with.
///
/// `Demo` compares against the fixed demo-account table; `Bcrypt` checks a
/// salted bcrypt hash stored on the user record. Production deployments
/// select `Bcrypt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialMode {
    Demo,
    Bcrypt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hex-encoded 32-byte signing key. When absent, an ephemeral random key
    /// is generated at startup and tokens do not survive a process restart.
    pub secret_key: Option<String>,
    pub token_ttl_minutes: i64,
    pub credential_mode: CredentialMode,
    /// Bcrypt cost override; `None` uses the crate default.
    pub bcrypt_cost: Option<u32>,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    pub fn from_env() -> Result<Self, AuthError> {
        let credential_mode = match env::var("PRAXIS_CREDENTIAL_MODE").ok().as_deref() {
            Some("bcrypt") => CredentialMode::Bcrypt,
            Some("demo") | None => CredentialMode::Demo,
            Some(other) => {
                return Err(AuthError::ConfigurationError(format!(
                    "Unknown credential mode: {}",
                    other
                )))
            }
        };

        Ok(Self {
            secret_key: env::var("PRAXIS_SECRET_KEY").ok(),
            token_ttl_minutes: env::var("PRAXIS_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            credential_mode,
            bcrypt_cost: env::var("PRAXIS_BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: None,
            token_ttl_minutes: 30,
            credential_mode: CredentialMode::Demo,
            bcrypt_cost: None,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}
