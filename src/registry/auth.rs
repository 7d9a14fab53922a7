//! Authentication module for registry access
//!
//! Produces a bearer token for the manifest endpoint by walking a fixed cascade:
//! a pre-supplied bearer token, then an auth token (supplied or built from
//! user/password) exchanged at `/v2/auth`, then `GITHUB_TOKEN` for ghcr.io.

use crate::config::RegistryCredentials;
use crate::error::{RegistryError, Result};
use crate::logging::{Logger, describe_secret};
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Clone)]
pub struct Auth {
    client: Client,
    output: Logger,
}

impl Auth {
    pub fn new(client: Client, output: Logger) -> Self {
        Self { client, output }
    }

    /// Obtain a bearer token for `auth_url`'s registry from `credentials`
    pub async fn bearer_token(&self, auth_url: Url, credentials: &RegistryCredentials) -> Result<String> {
        if let Some(token) = &credentials.bearer_token {
            self.output.verbose(&format!(
                "Using pre-supplied bearer token from {}_TOKEN",
                credentials.registry_name
            ));
            return Ok(token.clone());
        }

        let bearer = match self.bearer_from_auth_token(auth_url, credentials).await {
            Ok(token) => token,
            Err(err) => match credentials.github_bearer_token() {
                Some(token) => {
                    self.output.warning(&format!(
                        "Token exchange failed ({}), falling back to GITHUB_TOKEN",
                        err
                    ));
                    token
                }
                None => return Err(err),
            },
        };

        if bearer.is_empty() {
            return Err(RegistryError::Auth(format!(
                "could not get a bearer token for {}",
                credentials.registry_name
            )));
        }
        Ok(bearer)
    }

    async fn bearer_from_auth_token(&self, auth_url: Url, credentials: &RegistryCredentials) -> Result<String> {
        let auth_token = credentials.auth_token()?;
        self.exchange(auth_url, &auth_token).await
    }

    /// Exchange a basic auth token for a bearer token at the registry's token endpoint
    pub async fn exchange(&self, auth_url: Url, auth_token: &str) -> Result<String> {
        self.output.detail(&format!("Requesting token from: {}", auth_url));

        let response = self
            .client
            .get(auth_url)
            .header(AUTHORIZATION, format!("Basic {}", auth_token))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            self.output.debug(&format!("Token request failed with status {}", status));
            return Err(RegistryError::unexpected_status("auth", status));
        }

        let body = response.bytes().await?;
        let token_response: TokenResponse = serde_json::from_slice(&body)?;

        self.output
            .detail(&format!("Token obtained {}", describe_secret(&token_response.token)));
        Ok(token_response.token)
    }
}
