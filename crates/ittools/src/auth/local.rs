//! Local (username + password) authentication.

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::error::AuthError;
use super::token::TokenCodec;
use crate::user::{
    CredentialStore, NewUser, UserRole, is_unique_violation, is_valid_email, is_valid_username,
};

/// A registration as received from a client.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Registers principals and exchanges username/password for a session token.
#[derive(Clone)]
pub struct LocalAuthService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    bcrypt_cost: u32,
    /// Hash of a random password, verified against when there is no real
    /// hash so every failed login costs one bcrypt verification.
    dummy_hash: Arc<str>,
}

impl LocalAuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        bcrypt_cost: u32,
    ) -> anyhow::Result<Self> {
        let dummy_hash = bcrypt::hash(nanoid::nanoid!(32), bcrypt_cost)
            .context("Failed to prepare login hash")?;

        Ok(Self {
            store,
            codec,
            bcrypt_cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Register a new principal with a bcrypt-hashed password.
    ///
    /// Returns nothing on success; the stored hash never leaves the store.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<(), AuthError> {
        let Registration {
            username,
            email,
            password,
            role,
        } = registration;

        if !is_valid_username(&username) {
            return Err(AuthError::InvalidRegistration(
                "Invalid username format. Must be 3-50 alphanumeric characters, underscores, or hyphens."
                    .to_string(),
            ));
        }
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidRegistration(
                "Invalid email format.".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidRegistration(
                "Password must not be empty.".to_string(),
            ));
        }

        if self.store.exists_by_username(&username).await? {
            return Err(AuthError::DuplicateUsername);
        }
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;

        let saved = self
            .store
            .save(NewUser {
                username: username.clone(),
                email,
                password_hash: Some(password_hash),
                role,
            })
            .await;

        match saved {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role, "Registered new user");
                Ok(())
            }
            // Lost a race with a concurrent registration.
            Err(e) if is_unique_violation(&e) => {
                if self.store.exists_by_username(&username).await? {
                    Err(AuthError::DuplicateUsername)
                } else {
                    Err(AuthError::DuplicateEmail)
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check a username/password pair and issue a token on success.
    ///
    /// `UserNotFound` and `InvalidCredential` are kept apart for logging only;
    /// the HTTP layer renders both identically.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = self.store.find_by_username(username).await?;
        let stored_hash = user.as_ref().and_then(|u| u.password_hash.clone());

        let hash = stored_hash
            .clone()
            .unwrap_or_else(|| self.dummy_hash.to_string());
        let matches = verify_password(password.to_string(), hash).await?;

        let Some(user) = user else {
            warn!("Login failed: unknown user");
            return Err(AuthError::UserNotFound);
        };

        if stored_hash.is_none() {
            warn!(user_id = %user.id, "Login failed: account has no local credential");
            return Err(AuthError::InvalidCredential);
        }

        if !matches {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredential);
        }

        let token = self.codec.issue(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }
}

/// Hash a password using bcrypt, off the async workers.
async fn hash_password(password: String, cost: u32) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("password hashing task failed")?
        .context("Failed to hash password")
}

/// Verify a password against a bcrypt hash, off the async workers.
async fn verify_password(password: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("password verification task failed")?
        .context("Failed to verify password")
}
