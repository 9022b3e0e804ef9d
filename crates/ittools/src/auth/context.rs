//! Request-scoped security context and the extractors that read it.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::claims::Claims;
use super::error::AuthError;

/// Authority granted to administrators.
pub const ADMIN_AUTHORITY: &str = "ROLE_ADMIN";

/// The authenticated principal bound to a single request.
///
/// Created by the session filter from verified claims and stored in the
/// request's extensions. There is no mutating API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    subject: String,
    authorities: Vec<String>,
}

impl SecurityContext {
    /// Build a context for `subject` with the given authorities.
    pub fn new(subject: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            authorities,
        }
    }

    /// Username of the authenticated principal.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Granted authorities, e.g. `ROLE_USER`.
    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    pub fn is_admin(&self) -> bool {
        self.has_authority(ADMIN_AUTHORITY)
    }
}

impl From<Claims> for SecurityContext {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            authorities: claims.roles,
        }
    }
}

/// Authenticated caller, extracted from the bound security context.
///
/// Rejects with 401 when the request carries no valid token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SecurityContext);

impl CurrentUser {
    /// Get the username.
    pub fn username(&self) -> &str {
        self.0.subject()
    }

    /// Check if user is admin.
    pub fn is_admin(&self) -> bool {
        self.0.is_admin()
    }

    pub fn context(&self) -> &SecurityContext {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Require admin role.
///
/// Use as an extractor in handlers that require admin access.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions(
                "admin role required".to_string(),
            ));
        }

        Ok(RequireAdmin(user))
    }
}
