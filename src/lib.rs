//! Praxis Auth: credential and token core for a practice-management platform.
//!
//! This library authenticates users and issues time-limited HMAC-signed bearer
//! tokens. It owns the three pieces of state that matter: the process signing
//! key, the in-memory user registry, and the credential-verification policy.
//! Request routing, cookies, and page rendering live in the embedding service
//! and talk to this crate exclusively through [`platform::AuthPlatform`].

pub mod config;
pub mod core;
pub mod platform;

pub use crate::config::Config;
pub use crate::core::errors::AuthError;
pub use crate::platform::AuthPlatform;
