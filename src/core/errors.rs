// Domain error types - secure error handling with no information disclosure

use thiserror::Error;

/// Failure taxonomy for the auth core.
///
/// Every variant except `KeyError` and `ConfigurationError` is a recoverable
/// outcome returned to the caller as a value. The two startup variants are
/// fatal: a platform without a usable signing key cannot safely issue or
/// verify tokens and must not come up.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or non-matching password, reported identically (HTTP 401)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token past its expiry (HTTP 401)
    #[error("Token expired")]
    Expired,

    /// Signature does not match the token contents (HTTP 401)
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Not structurally a token: wrong segment count or undecodable segments (HTTP 401)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Decodable token whose claims lack the required subject (HTTP 401)
    #[error("Malformed claims")]
    MalformedClaims,

    /// Claims reference a user no longer resolvable in the registry (HTTP 401)
    #[error("Unknown subject")]
    UnknownSubject,

    /// Registration against an email that already exists (HTTP 409)
    #[error("Email already registered")]
    EmailConflict,

    /// Registration password rejected by policy (HTTP 422)
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Credential hashing or comparison failed internally (HTTP 500)
    #[error("Hashing error: {0}")]
    HashingError(String),

    /// Signing key could not be established at startup (fatal, HTTP 500)
    #[error("Key error: {0}")]
    KeyError(String),

    /// Configuration error (fatal, HTTP 500)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AuthError {
    /// HTTP status code for the external routing layer.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials
            | AuthError::Expired
            | AuthError::InvalidSignature
            | AuthError::InvalidToken(_)
            | AuthError::MalformedClaims
            | AuthError::UnknownSubject => 401,
            AuthError::EmailConflict => 409,
            AuthError::WeakPassword(_) => 422,
            AuthError::HashingError(_)
            | AuthError::KeyError(_)
            | AuthError::ConfigurationError(_) => 500,
        }
    }

    /// User-facing message. Never distinguishes unknown-user from
    /// wrong-password and never echoes credential material.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::Expired => "Session expired, please log in again".to_string(),
            AuthError::InvalidSignature
            | AuthError::InvalidToken(_)
            | AuthError::MalformedClaims
            | AuthError::UnknownSubject => "Not authenticated".to_string(),
            AuthError::EmailConflict => "Email already registered".to_string(),
            AuthError::WeakPassword(reason) => format!("Weak password: {}", reason),
            AuthError::HashingError(_)
            | AuthError::KeyError(_)
            | AuthError::ConfigurationError(_) => "Internal error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_401() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::Expired.status_code(), 401);
        assert_eq!(AuthError::InvalidSignature.status_code(), 401);
        assert_eq!(AuthError::EmailConflict.status_code(), 409);
        assert_eq!(AuthError::WeakPassword("short".into()).status_code(), 422);
    }

    #[test]
    fn credential_failures_are_indistinguishable_in_user_message() {
        // Unknown user and wrong password both surface as InvalidCredentials,
        // so a single message covers both probes.
        let msg = AuthError::InvalidCredentials.user_message();
        assert!(!msg.to_lowercase().contains("unknown"));
        assert!(!msg.to_lowercase().contains("not found"));
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = AuthError::HashingError("bcrypt: cost out of range".to_string());
        assert_eq!(err.user_message(), "Internal error");
    }
}
