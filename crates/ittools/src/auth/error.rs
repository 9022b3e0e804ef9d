//! Authentication errors.

use thiserror::Error;

/// Errors raised by the authentication core.
///
/// The variants are distinct so they can be logged precisely; at the HTTP
/// boundary every credential or token failure collapses into a generic
/// unauthorized response (see `api::error`).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token")]
    MalformedToken,

    #[error("token expired")]
    ExpiredToken,

    #[error("username already exists")]
    DuplicateUsername,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("user not found")]
    UserNotFound,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("authorization code missing")]
    MissingCode,

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetch(String),

    #[error("no primary verified email on the external account")]
    NoVerifiedEmail,

    #[error("could not provision external principal: {0}")]
    ProvisioningFailed(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("internal authentication error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether this error means "the caller could not be authenticated".
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken
                | AuthError::ExpiredToken
                | AuthError::UserNotFound
                | AuthError::InvalidCredential
                | AuthError::MissingCode
                | AuthError::TokenExchange(_)
                | AuthError::ProfileFetch(_)
                | AuthError::NoVerifiedEmail
                | AuthError::ProvisioningFailed(_)
                | AuthError::Unauthenticated
        )
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Internal(format!("{err:#}"))
    }
}
