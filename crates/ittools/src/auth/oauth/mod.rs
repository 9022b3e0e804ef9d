//! External identity (OAuth authorization-code) sign-in.
//!
//! One callback request runs the whole exchange: code → access token →
//! profile → verified email → local principal → session token → redirect.
//! Nothing is persisted between steps; any failure ends the request.

mod github;
mod provider;

pub use github::GithubProvider;
pub use provider::{
    ExternalEmail, ExternalProfile, IdentityProvider, ProviderError, ProviderResult,
    primary_verified_email,
};

use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::error::AuthError;
use super::token::TokenCodec;
use crate::user::{CredentialStore, NewUser, User, UserRole, sanitize_username, username_from_email};

/// Length of the random tag appended to a taken username.
const USERNAME_SUFFIX_LEN: usize = 6;

/// Usernames tried before a sign-in gives up.
const MAX_PROVISION_ATTEMPTS: usize = 3;

/// Reconciles an external identity with the local store and mints a token.
#[derive(Clone)]
pub struct ExternalIdentityExchange {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    frontend_callback_url: String,
}

impl ExternalIdentityExchange {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        frontend_callback_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            codec,
            frontend_callback_url: frontend_callback_url.into(),
        }
    }

    /// Run the exchange for `code` and return the frontend redirect URL
    /// carrying the issued token.
    #[instrument(skip_all)]
    pub async fn complete(&self, code: &str) -> Result<String, AuthError> {
        let token = self.sign_in(code).await?;
        Ok(format!(
            "{}?token={}",
            self.frontend_callback_url,
            urlencoding::encode(&token)
        ))
    }

    /// Run the exchange for `code` and return the issued token.
    pub async fn sign_in(&self, code: &str) -> Result<String, AuthError> {
        let user = self.resolve_principal(code).await?;
        let token = self.codec.issue(&user)?;
        info!(user_id = %user.id, "External sign-in completed");
        Ok(token)
    }

    async fn resolve_principal(&self, code: &str) -> Result<User, AuthError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::MissingCode);
        }

        let access_token = self
            .provider
            .exchange_code(code)
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let profile = self
            .provider
            .fetch_profile(&access_token)
            .await
            .map_err(|e| AuthError::ProfileFetch(e.to_string()))?;

        let email = match profile.email.as_deref().filter(|e| !e.is_empty()) {
            Some(email) => email.to_string(),
            None => {
                let emails = self
                    .provider
                    .fetch_emails(&access_token)
                    .await
                    .map_err(|e| AuthError::ProfileFetch(e.to_string()))?;
                primary_verified_email(&emails)
                    .ok_or(AuthError::NoVerifiedEmail)?
                    .to_string()
            }
        };

        if let Some(existing) = self.store.find_by_email(&email).await.map_err(provisioning)? {
            return Ok(existing);
        }

        self.provision(&profile, email).await
    }

    /// Create the local principal, retrying with a fresh suffix while the
    /// chosen username turns out to be taken.
    async fn provision(&self, profile: &ExternalProfile, email: String) -> Result<User, AuthError> {
        let base = base_username(profile, &email);
        let mut candidate = if self
            .store
            .exists_by_username(&base)
            .await
            .map_err(provisioning)?
        {
            suffixed(&base)
        } else {
            base.clone()
        };

        for attempt in 1..=MAX_PROVISION_ATTEMPTS {
            let provisioned = self
                .store
                .provision_external(NewUser {
                    username: candidate.clone(),
                    email: email.clone(),
                    password_hash: None,
                    role: UserRole::User,
                })
                .await
                .map_err(provisioning)?;

            if let Some(user) = provisioned {
                return Ok(user);
            }

            warn!(attempt, taken = %candidate, "Username claimed by another principal");
            candidate = suffixed(&base);
        }

        Err(AuthError::ProvisioningFailed(format!(
            "no free username after {MAX_PROVISION_ATTEMPTS} attempts"
        )))
    }
}

/// Preferred local username: GitHub login, then display name, then the
/// email local part.
fn base_username(profile: &ExternalProfile, email: &str) -> String {
    sanitize_username(&profile.login)
        .or_else(|| profile.name.as_deref().and_then(sanitize_username))
        .unwrap_or_else(|| username_from_email(email))
}

fn suffixed(base: &str) -> String {
    let stem: String = base.chars().take(50 - USERNAME_SUFFIX_LEN - 1).collect();
    format!("{stem}_{}", nanoid::nanoid!(USERNAME_SUFFIX_LEN))
}

fn provisioning(err: anyhow::Error) -> AuthError {
    AuthError::ProvisioningFailed(format!("{err:#}"))
}
