//! Core domain kernel.
//!
//! Everything with real state and invariants lives here: the signing key and
//! token codec, the user registry, credential verification, and the services
//! composing them. Nothing in this module knows about HTTP or any transport.

pub mod accounts;
pub mod credentials;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod registry;
pub mod session;
