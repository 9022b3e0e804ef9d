//! GitHub OAuth client.

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use super::provider::{
    ExternalEmail, ExternalProfile, IdentityProvider, ProviderError, ProviderResult,
};
use crate::auth::config::GithubConfig;

/// Body sent to the token endpoint.
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

/// GitHub answers token errors with 200 and an `error` field.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// Client for GitHub's OAuth and user endpoints.
#[derive(Debug, Clone)]
pub struct GithubProvider {
    /// HTTP client.
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
    profile_url: String,
    emails_url: String,
}

impl GithubProvider {
    /// Create a GitHub client from configuration.
    pub fn new(config: &GithubConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("ittools/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.resolve_client_secret()?,
            redirect_uri: config.redirect_uri.clone(),
            token_url: config.token_url.clone(),
            profile_url: config.profile_url.clone(),
            emails_url: config.emails_url.clone(),
        })
    }

    /// GET a JSON resource with the account's access token.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> ProviderResult<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for GithubProvider {
    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> ProviderResult<String> {
        let response = self
            .client
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .json(&TokenRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code,
                redirect_uri: &self.redirect_uri,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                url: self.token_url.clone(),
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                debug!("Exchanged authorization code for access token");
                Ok(token)
            }
            _ => Err(ProviderError::MissingAccessToken(
                body.error.unwrap_or_else(|| "empty response".to_string()),
            )),
        }
    }

    #[instrument(skip_all)]
    async fn fetch_profile(&self, access_token: &str) -> ProviderResult<ExternalProfile> {
        self.get_json(&self.profile_url, access_token).await
    }

    #[instrument(skip_all)]
    async fn fetch_emails(&self, access_token: &str) -> ProviderResult<Vec<ExternalEmail>> {
        self.get_json(&self.emails_url, access_token).await
    }
}
