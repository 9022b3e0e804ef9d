//! Application state shared across handlers.

use anyhow::Result;
use std::sync::Arc;

use crate::auth::{
    AuthConfig, AuthState, ExternalIdentityExchange, GithubProvider, IdentityProvider,
    LocalAuthService, TokenCodec,
};
use crate::catalog::{FavoriteRepository, ToolRepository};
use crate::db::Database;
use crate::user::UserRepository;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// User repository (also the credential store).
    pub users: Arc<UserRepository>,
    /// Tool catalog.
    pub tools: Arc<ToolRepository>,
    /// Per-user favorites.
    pub favorites: Arc<FavoriteRepository>,
    /// Username/password registration and login.
    pub local_auth: LocalAuthService,
    /// GitHub sign-in.
    pub oauth: ExternalIdentityExchange,
    /// Authentication state for the session filter.
    pub auth: AuthState,
    /// Allowed CORS origins.
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    /// Create application state backed by GitHub for external sign-in.
    pub fn new(db: &Database, config: &AuthConfig) -> Result<Self> {
        let provider = Arc::new(GithubProvider::new(&config.github)?);
        Self::with_identity_provider(db, config, provider)
    }

    /// Create application state with an explicit identity provider.
    pub fn with_identity_provider(
        db: &Database,
        config: &AuthConfig,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        let codec = Arc::new(TokenCodec::from_config(config)?);
        let users = Arc::new(UserRepository::new(db.pool().clone()));

        let local_auth =
            LocalAuthService::new(users.clone(), codec.clone(), config.bcrypt_cost)?;
        let oauth = ExternalIdentityExchange::new(
            provider,
            users.clone(),
            codec.clone(),
            config.github.frontend_callback_url.clone(),
        );

        Ok(Self {
            users,
            tools: Arc::new(ToolRepository::new(db.pool().clone())),
            favorites: Arc::new(FavoriteRepository::new(db.pool().clone())),
            local_auth,
            oauth,
            auth: AuthState::new(codec),
            allowed_origins: Arc::new(config.allowed_origins.clone()),
        })
    }
}
