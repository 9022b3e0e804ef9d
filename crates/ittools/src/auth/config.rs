//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Shortest accepted HS256 secret.
const MIN_SECRET_LEN: usize = 32;

/// bcrypt's accepted cost range.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Supports `env:VAR_NAME` indirection.
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,

    /// bcrypt cost factor for stored passwords.
    pub bcrypt_cost: u32,

    /// Allowed CORS origins.
    pub allowed_origins: Vec<String>,

    /// GitHub sign-in.
    pub github: GithubConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // No default secret; must be configured.
            jwt_secret: None,
            token_ttl_secs: 60 * 60 * 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            github: GithubConfig::default(),
        }
    }
}

/// GitHub OAuth application settings and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub client_id: String,
    /// Supports `env:VAR_NAME` indirection.
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,
    pub profile_url: String,
    pub emails_url: String,
    /// Frontend page that receives `?token=...` after sign-in.
    pub frontend_callback_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8080/auth/github/callback".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            profile_url: "https://api.github.com/user".to_string(),
            emails_url: "https://api.github.com/user/emails".to_string(),
            frontend_callback_url: "http://localhost:5173/auth/github/callback".to_string(),
        }
    }
}

impl GithubConfig {
    /// Resolve the client secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_client_secret(&self) -> Result<String, ConfigValidationError> {
        resolve_env_ref(&self.client_secret)
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    /// Returns the resolved secret or None if not configured.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        self.jwt_secret.as_deref().map(resolve_env_ref).transpose()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let secret = self
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::JwtSecretTooShort);
        }

        if self.token_ttl_secs <= 0 {
            return Err(ConfigValidationError::InvalidTokenTtl(self.token_ttl_secs));
        }

        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            return Err(ConfigValidationError::InvalidBcryptCost(self.bcrypt_cost));
        }

        self.github.resolve_client_secret()?;

        Ok(())
    }

    /// Generate a random 64-character alphanumeric JWT secret.
    pub fn generate_jwt_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

fn resolve_env_ref(value: &str) -> Result<String, ConfigValidationError> {
    let Some(var_name) = value.strip_prefix("env:") else {
        return Ok(value.to_string());
    };

    match std::env::var(var_name) {
        Ok(resolved) if !resolved.is_empty() => Ok(resolved),
        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error(
        "JWT secret is required. Set ITTOOLS__AUTH__JWT_SECRET or auth.jwt_secret in config."
    )]
    MissingJwtSecret,

    #[error("JWT secret must be at least 32 characters long.")]
    JwtSecretTooShort,

    #[error("token_ttl_secs must be positive (got {0}).")]
    InvalidTokenTtl(i64),

    #[error("bcrypt_cost must be between 4 and 31 (got {0}).")]
    InvalidBcryptCost(u32),

    #[error("Environment variable '{0}' not found (referenced via env:{0} in config).")]
    EnvVarNotFound(String),

    #[error("Environment variable '{0}' is empty (referenced via env:{0} in config).")]
    EnvVarEmpty(String),
}
