//! Account creation and startup seeding.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::credentials::{CredentialScheme, Password};
use crate::core::errors::AuthError;
use crate::core::models::{Role, User};
use crate::core::registry::UserRegistry;

/// Demo accounts seeded at startup: (email, password, name, role).
const DEMO_ACCOUNTS: &[(&str, &str, &str, Role)] = &[
    ("admin@legalplatform.com", "admin123", "Platform Admin", Role::Admin),
    (
        "practitioner@legalplatform.com",
        "practitioner123",
        "Demo Practitioner",
        Role::Practitioner,
    ),
    (
        "assistant@legalplatform.com",
        "assistant123",
        "Demo Assistant",
        Role::Assistant,
    ),
];

pub struct RegistrationService {
    registry: Arc<UserRegistry>,
    scheme: Arc<dyn CredentialScheme>,
}

impl RegistrationService {
    pub fn new(registry: Arc<UserRegistry>, scheme: Arc<dyn CredentialScheme>) -> Self {
        Self { registry, scheme }
    }

    /// Create an account.
    ///
    /// The id is role-prefixed and collision-resistant
    /// (`"{role}-{uuid-v4}"`). Credential material is produced by the active
    /// scheme, and the email-uniqueness check rides on the registry's atomic
    /// `put`, so concurrent registrations of one email admit a single winner.
    pub async fn register(
        &self,
        email: &str,
        password: &Password,
        name: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        self.scheme.validate(password)?;
        let password_hash = self.scheme.hash(password).await?;

        let user = User {
            id: format!("{}-{}", role, Uuid::new_v4()),
            email: email.to_string(),
            name: name.to_string(),
            role,
            password_hash,
            created_at: Utc::now(),
            last_login_at: None,
        };

        self.registry.put(user.clone()).await?;

        info!(
            target: "audit",
            event_type = "Registration",
            user_id = %user.id,
            email = %user.email,
            role = %user.role,
        );

        Ok(user)
    }

    /// Seed the demo accounts. An email that already exists is skipped, so
    /// seeding is idempotent.
    pub async fn seed_demo_users(&self) -> Result<usize, AuthError> {
        let mut seeded = 0;
        for (email, password, name, role) in DEMO_ACCOUNTS {
            match self
                .register(email, &Password::new(password), name, *role)
                .await
            {
                Ok(_) => seeded += 1,
                Err(AuthError::EmailConflict) => {}
                Err(e) => return Err(e),
            }
        }
        info!(
            target: "audit",
            event_type = "Bootstrap",
            seeded = seeded,
            registry_size = self.registry.len().await,
        );
        Ok(seeded)
    }
}
