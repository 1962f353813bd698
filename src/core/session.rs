//! Session orchestration.
//!
//! Composes the registry, credential scheme, and token signer into the two
//! operations the routing layer actually calls: `login` and `current_user`.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::credentials::{CredentialScheme, Password};
use crate::core::crypto::TokenSigner;
use crate::core::errors::AuthError;
use crate::core::models::{LoginResponse, PublicUser, User};
use crate::core::registry::UserRegistry;

/// Comparison target for the unknown-email path, so a registry miss still
/// pays the same verification cost as a wrong password. Bcrypt hash of a
/// throwaway value; never matches a real credential.
const UNKNOWN_USER_STORED: &str = "$2a$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

pub struct SessionService {
    registry: Arc<UserRegistry>,
    scheme: Arc<dyn CredentialScheme>,
    signer: Arc<TokenSigner>,
    token_ttl: Duration,
}

impl SessionService {
    pub fn new(
        registry: Arc<UserRegistry>,
        scheme: Arc<dyn CredentialScheme>,
        signer: Arc<TokenSigner>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            registry,
            scheme,
            signer,
            token_ttl,
        }
    }

    /// Authenticate and issue a token.
    ///
    /// Unknown email and wrong password both fail with `InvalidCredentials`;
    /// the caller can never tell which, so accounts cannot be enumerated.
    pub async fn login(&self, email: &str, password: &Password) -> Result<LoginResponse, AuthError> {
        let user = self.authenticate(email, password).await?;

        // Issue before stamping: last_login_at records completed logins only.
        let token = self.signer.issue(&user, self.token_ttl)?;
        self.registry.record_login(&user.email, Utc::now()).await;

        info!(
            target: "audit",
            event_type = "Login",
            user_id = %user.id,
            email = %user.email,
            role = %user.role,
        );

        Ok(LoginResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            user: PublicUser::from(&user),
        })
    }

    /// Resolve a presented token to its user.
    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.signer.verify(token).map_err(|e| {
            warn!(reason = %e, "Rejected token");
            e
        })?;

        self.registry
            .get(&claims.sub)
            .await
            .ok_or(AuthError::UnknownSubject)
    }

    async fn authenticate(&self, email: &str, password: &Password) -> Result<User, AuthError> {
        let user = match self.registry.get(email).await {
            Some(user) => user,
            None => {
                // Burn an equivalent comparison so the miss is not
                // distinguishable from a wrong password by timing.
                let _ = self
                    .scheme
                    .verify(email, password, UNKNOWN_USER_STORED)
                    .await;
                warn!(target: "audit", event_type = "LoginFailed", email = %email);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let matched = self
            .scheme
            .verify(email, password, &user.password_hash)
            .await?;
        if !matched {
            warn!(target: "audit", event_type = "LoginFailed", email = %email);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::DemoCredentials;
    use crate::core::crypto::SecretKey;
    use crate::core::models::Role;

    fn service() -> SessionService {
        SessionService::new(
            Arc::new(UserRegistry::new()),
            Arc::new(DemoCredentials::new()),
            Arc::new(TokenSigner::new(SecretKey::generate())),
            Duration::minutes(30),
        )
    }

    async fn seed(service: &SessionService, email: &str, password: &str) {
        let stored = service
            .scheme
            .hash(&Password::new(password))
            .await
            .unwrap();
        service
            .registry
            .put(User {
                id: format!("practitioner-{}", uuid::Uuid::new_v4()),
                email: email.to_string(),
                name: "Test".to_string(),
                role: Role::Practitioner,
                password_hash: stored,
                created_at: Utc::now(),
                last_login_at: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn login_issues_token_and_stamps_last_login() {
        let service = service();
        seed(&service, "p@x.com", "pw-longenough").await;

        let response = service.login("p@x.com", &Password::new("pw-longenough")).await.unwrap();
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.user.email, "p@x.com");

        let user = service.registry.get("p@x.com").await.unwrap();
        assert!(user.last_login_at.is_some());

        let claims = service.signer.verify(&response.access_token).unwrap();
        assert_eq!(claims.sub, "p@x.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_identically() {
        let service = service();
        seed(&service, "p@x.com", "pw-longenough").await;

        let wrong_password = service
            .login("p@x.com", &Password::new("bad"))
            .await
            .unwrap_err();
        let unknown_email = service
            .login("ghost@x.com", &Password::new("bad"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.user_message(), unknown_email.user_message());
    }

    #[tokio::test]
    async fn failed_login_does_not_stamp_last_login() {
        let service = service();
        seed(&service, "p@x.com", "pw-longenough").await;

        let _ = service.login("p@x.com", &Password::new("bad")).await;
        assert!(service
            .registry
            .get("p@x.com")
            .await
            .unwrap()
            .last_login_at
            .is_none());
    }

    #[tokio::test]
    async fn unknown_email_under_bcrypt_still_fails_with_invalid_credentials() {
        // The registry-miss path runs a comparison against a fixed stored
        // value; its outcome (including any internal error) must never leak
        // past the uniform failure.
        let service = SessionService::new(
            Arc::new(UserRegistry::new()),
            Arc::new(crate::core::credentials::BcryptCredentials::new(Some(4))),
            Arc::new(TokenSigner::new(SecretKey::generate())),
            Duration::minutes(30),
        );

        assert!(matches!(
            service.login("ghost@x.com", &Password::new("anything")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn current_user_resolves_a_fresh_token() {
        let service = service();
        seed(&service, "p@x.com", "pw-longenough").await;

        let response = service
            .login("p@x.com", &Password::new("pw-longenough"))
            .await
            .unwrap();
        let user = service.current_user(&response.access_token).await.unwrap();
        assert_eq!(user.email, "p@x.com");
    }

    #[tokio::test]
    async fn current_user_with_unresolvable_subject_fails() {
        let service = service();
        // Token signed by our own key for a subject never inserted.
        let phantom = User {
            id: "practitioner-phantom".to_string(),
            email: "phantom@x.com".to_string(),
            name: "Phantom".to_string(),
            role: Role::Practitioner,
            password_hash: String::new(),
            created_at: Utc::now(),
            last_login_at: None,
        };
        let token = service.signer.issue(&phantom, Duration::minutes(30)).unwrap();

        assert!(matches!(
            service.current_user(&token).await,
            Err(AuthError::UnknownSubject)
        ));
    }
}
