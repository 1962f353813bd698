//! Composition root.
//!
//! `AuthPlatform` owns the signing key, registry, and credential scheme
//! explicitly and hands references into the services, so there are no hidden
//! process-wide singletons. The embedding routing layer calls the methods
//! here and maps `AuthError` to responses via `status_code()` and
//! `user_message()`.

use chrono::Duration;
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, CredentialMode};
use crate::core::accounts::RegistrationService;
use crate::core::credentials::{BcryptCredentials, CredentialScheme, DemoCredentials, Password};
use crate::core::crypto::{SecretKey, TokenSigner};
use crate::core::errors::AuthError;
use crate::core::models::{Claims, LoginResponse, PublicUser, RegisteredUser, Role};
use crate::core::registry::UserRegistry;
use crate::core::session::SessionService;

pub struct AuthPlatform {
    sessions: SessionService,
    registration: RegistrationService,
    signer: Arc<TokenSigner>,
}

impl AuthPlatform {
    /// Wire the platform from configuration and seed the demo accounts.
    ///
    /// Failure to establish the signing key is fatal by design: with no
    /// usable secret the platform can neither issue nor verify tokens, so
    /// startup must abort rather than limp along.
    pub async fn from_config(config: &Config) -> Result<Self, AuthError> {
        let secret = SecretKey::from_config(config)?;
        if config.secret_key.is_none() {
            info!("No configured secret key; using an ephemeral key, tokens will not survive a restart");
        }

        let signer = Arc::new(TokenSigner::new(secret));
        let registry = Arc::new(UserRegistry::new());
        let scheme: Arc<dyn CredentialScheme> = match config.credential_mode {
            CredentialMode::Demo => Arc::new(DemoCredentials::new()),
            CredentialMode::Bcrypt => Arc::new(BcryptCredentials::new(config.bcrypt_cost)),
        };

        let sessions = SessionService::new(
            registry.clone(),
            scheme.clone(),
            signer.clone(),
            Duration::minutes(config.token_ttl_minutes),
        );
        let registration = RegistrationService::new(registry, scheme);
        registration.seed_demo_users().await?;

        Ok(Self {
            sessions,
            registration,
            signer,
        })
    }

    /// Authenticate and issue a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        self.sessions.login(email, &Password::new(password)).await
    }

    /// Create an account. `role` defaults to practitioner.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Option<Role>,
    ) -> Result<RegisteredUser, AuthError> {
        let user = self
            .registration
            .register(
                email,
                &Password::new(password),
                name,
                role.unwrap_or(Role::Practitioner),
            )
            .await?;
        Ok(RegisteredUser::from(&user))
    }

    /// Validate a token's signature and expiry and recover its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.signer.verify(token)
    }

    /// Resolve a token to the public shape of its user.
    pub async fn get_current_user(&self, token: &str) -> Result<PublicUser, AuthError> {
        let user = self.sessions.current_user(token).await?;
        Ok(PublicUser::from(&user))
    }
}
