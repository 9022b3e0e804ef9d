//! Session token codec (HS256 JWT).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use super::claims::Claims;
use super::config::AuthConfig;
use super::error::AuthError;
use crate::user::User;

/// Issues and verifies signed, self-contained session tokens.
///
/// Built once at startup and shared read-only (`Arc<TokenCodec>`).
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec from a raw secret and token lifetime.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// Create a codec from validated auth configuration.
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let secret = config
            .resolve_jwt_secret()?
            .ok_or_else(|| anyhow::anyhow!("JWT secret is not configured"))?;
        Ok(Self::new(&secret, config.token_ttl_secs))
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for `user`, valid from now for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, user: &User, now: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.username.clone(),
            roles: vec![user.role.authority().to_string()],
            iat: now,
            exp: now + self.ttl_secs,
            jti: nanoid::nanoid!(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))
    }

    /// Verify a token's signature and expiry against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (Unix seconds).
    ///
    /// Any structural or signature failure is `MalformedToken`. Only a token
    /// whose signature checks out can be reported as `ExpiredToken`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::MalformedToken
        })?;

        let claims = data.claims;
        if now > claims.exp {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }

    /// Subject (username) asserted by verified claims.
    pub fn extract_subject(claims: &Claims) -> &str {
        &claims.sub
    }

    /// Authorities asserted by verified claims.
    pub fn extract_roles(claims: &Claims) -> &[String] {
        &claims.roles
    }
}
