//! In-memory user registry.
//!
//! The only mutable shared state in the crate. Email uniqueness is the one
//! invariant: `put` performs its existence check and insert under a single
//! write lock, so concurrent registrations of the same email admit exactly
//! one winner.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;

use crate::core::errors::AuthError;
use crate::core::models::User;

#[derive(Default)]
pub struct UserRegistry {
    users: RwLock<HashMap<String, User>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a user by email. No side effect.
    pub async fn get(&self, email: &str) -> Option<User> {
        self.users.read().await.get(email).cloned()
    }

    /// Insert a user if and only if the email is absent.
    ///
    /// Check and insert happen under one write lock; on conflict the registry
    /// is left untouched.
    pub async fn put(&self, user: User) -> Result<(), AuthError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(AuthError::EmailConflict);
        }
        users.insert(user.email.clone(), user);
        Ok(())
    }

    /// Stamp `last_login_at` for an existing entry. A vanished entry is not
    /// an error (there is no deletion API, so it is not expected either).
    pub async fn record_login(&self, email: &str, timestamp: DateTime<Utc>) {
        let mut users = self.users.write().await;
        match users.get_mut(email) {
            Some(user) => user.last_login_at = Some(timestamp),
            None => warn!(email = %email, "record_login for missing registry entry"),
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Role;

    fn user(email: &str) -> User {
        User {
            id: format!("practitioner-{}", email),
            email: email.to_string(),
            name: "Test".to_string(),
            role: Role::Practitioner,
            password_hash: "pw".to_string(),
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let registry = UserRegistry::new();
        registry.put(user("a@x.com")).await.unwrap();

        let found = registry.get("a@x.com").await.unwrap();
        assert_eq!(found.email, "a@x.com");
        assert!(registry.get("b@x.com").await.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_leaves_registry_unchanged() {
        let registry = UserRegistry::new();
        registry.put(user("a@x.com")).await.unwrap();

        let mut second = user("a@x.com");
        second.name = "Imposter".to_string();
        let result = registry.put(second).await;
        assert!(matches!(result, Err(AuthError::EmailConflict)));

        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get("a@x.com").await.unwrap().name, "Test");
    }

    #[tokio::test]
    async fn record_login_stamps_existing_entry_only() {
        let registry = UserRegistry::new();
        registry.put(user("a@x.com")).await.unwrap();

        let stamp = Utc::now();
        registry.record_login("a@x.com", stamp).await;
        assert_eq!(
            registry.get("a@x.com").await.unwrap().last_login_at,
            Some(stamp)
        );

        // Missing entry: silent no-op.
        registry.record_login("ghost@x.com", stamp).await;
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_puts_of_same_email_admit_one_winner() {
        let registry = std::sync::Arc::new(UserRegistry::new());

        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let mut u = user("contested@x.com");
                u.name = format!("caller-{}", i);
                registry.put(u).await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(registry.len().await, 1);
    }
}
