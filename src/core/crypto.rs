//! Signing key and token codec.
//!
//! This module provides the `TokenSigner`, which mints and verifies the
//! compact three-segment bearer tokens:
//! `base64url(header).base64url(payload).base64url(hmac_sha256(header.payload))`.
//! The signature key is held by `SecretKey`, established exactly once at
//! process start and read-only thereafter, so the signer is safe to share
//! across unbounded concurrent callers.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use std::fmt;

use crate::config::Config;
use crate::core::errors::AuthError;
use crate::core::models::{Claims, User};

type HmacSha256 = Hmac<Sha256>;

pub const SECRET_KEY_LENGTH: usize = 32;

/// Process-wide signing key. Never persisted, never logged.
#[derive(Clone)]
pub struct SecretKey([u8; SECRET_KEY_LENGTH]);

impl SecretKey {
    /// Establish the signing key from configuration.
    ///
    /// A configured value must be exactly 64 hex characters; anything else is
    /// a fatal startup error. Absent a configured value, an ephemeral key is
    /// drawn from the OS RNG, which means tokens issued before a restart are
    /// unverifiable afterwards.
    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        match &config.secret_key {
            Some(hex_str) => {
                let bytes = hex::decode(hex_str)
                    .map_err(|e| AuthError::KeyError(format!("Invalid hex secret key: {}", e)))?;
                let key: [u8; SECRET_KEY_LENGTH] = bytes.try_into().map_err(|_| {
                    AuthError::KeyError(format!(
                        "Secret key must be {} bytes ({} hex characters)",
                        SECRET_KEY_LENGTH,
                        SECRET_KEY_LENGTH * 2
                    ))
                })?;
                Ok(Self(key))
            }
            None => Ok(Self::generate()),
        }
    }

    /// Generate a fresh random key from the OS RNG.
    pub fn generate() -> Self {
        let mut key = [0u8; SECRET_KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&"<REDACTED>").finish()
    }
}

/// Mints and verifies signed bearer tokens.
///
/// Both operations are pure functions of their inputs, the key, and the
/// clock; neither touches any shared mutable state.
pub struct TokenSigner {
    secret: SecretKey,
}

impl TokenSigner {
    pub fn new(secret: SecretKey) -> Self {
        Self { secret }
    }

    /// Issue a token for `user` expiring `ttl` from now.
    pub fn issue(&self, user: &User, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.email.clone(),
            user_id: user.id.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        self.sign_claims(&claims)
    }

    /// Sign an already-built claims value. Exposed for tests that need
    /// control over `exp` and `iat`.
    pub fn sign_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        let header = serde_json::json!({ "alg": "HS256", "typ": "JWT" });

        let header_b64 = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&header)
                .map_err(|e| AuthError::HashingError(format!("Header serialization: {}", e)))?,
        );
        let payload_b64 = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(claims)
                .map_err(|e| AuthError::HashingError(format!("Claims serialization: {}", e)))?,
        );

        let message = format!("{}.{}", header_b64, payload_b64);
        let signature = self.mac_over(message.as_bytes())?;
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

        Ok(format!("{}.{}", message, signature_b64))
    }

    /// Verify a presented token and recover its claims.
    ///
    /// Checks, in order: structure (three segments, decodable signature),
    /// signature (constant-time HMAC comparison), claims shape (subject must
    /// be present and non-empty), then expiry against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(AuthError::InvalidToken(format!(
                "Expected 3 segments, got {}",
                parts.len()
            )));
        }

        let message = format!("{}.{}", parts[0], parts[1]);
        let provided_sig = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| AuthError::InvalidToken("Undecodable signature segment".to_string()))?;

        // Constant-time comparison against the recomputed HMAC.
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        mac.update(message.as_bytes());
        if mac.verify_slice(&provided_sig).is_err() {
            return Err(AuthError::InvalidSignature);
        }

        // Signature checks out; only now is the payload trusted enough to decode.
        let payload = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| AuthError::MalformedClaims)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::MalformedClaims)?;

        if claims.sub.is_empty() {
            return Err(AuthError::MalformedClaims);
        }

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    fn mac_over(&self, message: &[u8]) -> Result<Vec<u8>, AuthError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
