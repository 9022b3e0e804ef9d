//! External identity provider seam.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors talking to an external identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Token endpoint answered without an access token.
    #[error("no access token in response: {0}")]
    MissingAccessToken(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Profile returned by the provider's user endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalProfile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Public email; often absent.
    #[serde(default)]
    pub email: Option<String>,
}

/// One entry of the provider's email list.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalEmail {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}

/// The three calls an authorization-code sign-in makes to the provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> ProviderResult<String>;

    /// Fetch the signed-in account's profile.
    async fn fetch_profile(&self, access_token: &str) -> ProviderResult<ExternalProfile>;

    /// Fetch the account's email addresses.
    async fn fetch_emails(&self, access_token: &str) -> ProviderResult<Vec<ExternalEmail>>;
}

/// Pick the address marked both primary and verified.
pub fn primary_verified_email(emails: &[ExternalEmail]) -> Option<&str> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email.as_str())
}
