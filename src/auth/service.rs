// Authentication service - registration, login and token resolution

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{CurrentUser, LoginOutcome, NewUser},
    password::PasswordService,
    repository::{TokenRepository, UserRepository},
    token::{token_digest, TokenService},
};

/// Authentication service coordinating all auth operations
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    token_repo: Arc<dyn TokenRepository>,
    password_service: PasswordService,
    token_service: TokenService,
    /// Digest verified against when the email is unknown, so both login
    /// failures cost one password check
    decoy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_repo: Arc<dyn TokenRepository>,
        password_service: PasswordService,
        token_service: TokenService,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            password_service,
            token_service,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Register a new account and its empty cart, returning the new user id
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Uuid, AuthError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            debug!("Registration rejected, email already present");
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = self.hash_password(password).await?;

        // A concurrent registration can still win the race; the store's unique
        // constraint turns that into EmailAlreadyExists as well.
        let (user, cart) = self
            .user_repo
            .create_account(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        info!("Registered user {} with cart {}", user.id, cart.id);
        Ok(user.id)
    }

    /// Authenticate by email and password and issue a session token
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            let decoy = self.decoy_hash().await?;
            let _ = self.verify_password(password, decoy).await;
            warn!("Login failed: no account for the supplied email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            warn!("Login failed: password mismatch for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.token_service.issue(user.id)?;

        // The token is already valid; a failed audit write must not block login
        if let Err(e) = self.token_repo.record_issued(user.id, &token_digest(&token)).await {
            warn!("Failed to record issued token for user {}: {}", user.id, e);
        }

        info!("User {} logged in", user.id);
        Ok(LoginOutcome {
            name: user.name,
            email: user.email,
            token,
        })
    }

    /// Verify a token and load the identity it names
    pub async fn resolve_token(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.token_service.verify(token)?;

        match self.user_repo.find_by_id(claims.user_id).await? {
            Some(user) => Ok(CurrentUser::from(user)),
            None => Err(AuthError::UnknownUser),
        }
    }

    async fn decoy_hash(&self) -> Result<&str, AuthError> {
        self.decoy_hash
            .get_or_try_init(|| self.hash_password("decoy-password-never-matches"))
            .await
            .map(String::as_str)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.password_service.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.password_service.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
    }
}
