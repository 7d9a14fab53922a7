// RegistryClient answers "does this tag exist?" for one image in one registry.
// It tries anonymously first and only walks the credential cascade when the
// anonymous attempt cannot give a definitive answer.

use crate::common::TagChecker;
use crate::config::{RegistryConfig, RegistryCredentials};
use crate::error::{RegistryError, Result};
use crate::logging::Logger;
use crate::registry::auth::Auth;
use crate::registry::manifest::{ManifestStatus, check_manifest};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub struct RegistryClientBuilder {
    config: RegistryConfig,
    credentials: Option<RegistryCredentials>,
    http_client: Option<Client>,
    timeout: Option<Duration>,
    skip_tls: bool,
    plain_http: bool,
    output: Logger,
}

impl RegistryClientBuilder {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            credentials: None,
            http_client: None,
            timeout: None,
            skip_tls: false,
            plain_http: false,
            output: Logger::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: RegistryCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Use a pre-built HTTP client; timeout and TLS options are then ignored
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_skip_tls(mut self, skip_tls: bool) -> Self {
        self.skip_tls = skip_tls;
        self
    }

    /// Talk `http://` instead of `https://`
    pub fn with_plain_http(mut self, plain_http: bool) -> Self {
        self.plain_http = plain_http;
        self
    }

    pub fn with_logger(mut self, output: Logger) -> Self {
        self.output = output;
        self
    }

    pub fn build(self) -> Result<RegistryClient> {
        self.config.validate()?;

        let client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if self.skip_tls {
                    builder = builder
                        .danger_accept_invalid_certs(true)
                        .danger_accept_invalid_hostnames(true);
                }
                builder.build()?
            }
        };

        let credentials = self
            .credentials
            .unwrap_or_else(|| RegistryCredentials::anonymous(self.config.name.clone()));

        // The GHCR_IO fallback and error messages key off the credentials' name
        if credentials.registry_name != self.config.name {
            return Err(RegistryError::Validation(format!(
                "Credentials for {} cannot be used with registry {}",
                credentials.registry_name, self.config.name
            )));
        }

        Ok(RegistryClient {
            auth: Auth::new(client.clone(), self.output.clone()),
            client,
            config: self.config,
            credentials,
            scheme: if self.plain_http { "http" } else { "https" },
            output: self.output,
        })
    }
}

/// Result of the anonymous attempt
#[derive(Debug)]
pub enum AnonymousOutcome {
    /// The registry answered definitively without credentials
    Answer(ManifestStatus),
    /// The anonymous attempt failed; the error is kept for diagnostics only
    NeedsAuth(RegistryError),
}

pub struct RegistryClient {
    client: Client,
    auth: Auth,
    config: RegistryConfig,
    credentials: RegistryCredentials,
    scheme: &'static str,
    output: Logger,
}

impl RegistryClient {
    /// Client for `config` with credentials read from the process environment
    pub fn from_env(config: RegistryConfig) -> Result<Self> {
        let credentials = RegistryCredentials::from_env(&config.name);
        Self::builder(config).with_credentials(credentials).build()
    }

    pub fn builder(config: RegistryConfig) -> RegistryClientBuilder {
        RegistryClientBuilder::new(config)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Check whether `tag` exists, falling back to authenticated access
    /// when the anonymous attempt fails.
    pub async fn is_tag_exist(&self, tag: &str) -> Result<bool> {
        if tag.is_empty() {
            return Err(RegistryError::Validation("Tag cannot be empty".to_string()));
        }

        self.output.verbose(&format!(
            "Checking {}/{}:{}",
            self.config.url, self.config.image_path, tag
        ));

        match self.check_anonymously(tag).await? {
            AnonymousOutcome::Answer(status) => {
                self.output.verbose("Anonymous check answered");
                return Ok(status.exists());
            }
            AnonymousOutcome::NeedsAuth(err) => {
                self.output.verbose(&format!(
                    "Anonymous check failed ({}), retrying with credentials",
                    err
                ));
            }
        }

        let bearer = self.auth.bearer_token(self.auth_url()?, &self.credentials).await?;
        let status = check_manifest(&self.client, self.manifest_url(tag)?, Some(&bearer), &self.output).await?;
        Ok(status.exists())
    }

    /// Anonymous manifest check. Any failure, transport errors included,
    /// becomes [`AnonymousOutcome::NeedsAuth`]; only URL construction errors propagate.
    pub async fn check_anonymously(&self, tag: &str) -> Result<AnonymousOutcome> {
        let url = self.manifest_url(tag)?;
        Ok(match check_manifest(&self.client, url, None, &self.output).await {
            Ok(status) => AnonymousOutcome::Answer(status),
            Err(err) => AnonymousOutcome::NeedsAuth(err),
        })
    }

    /// `{scheme}://{registry}/v2/{image_path}/manifests/{tag}`
    pub fn manifest_url(&self, tag: &str) -> Result<Url> {
        let url = Url::parse(&format!(
            "{}://{}/v2/{}/manifests/{}",
            self.scheme, self.config.url, self.config.image_path, tag
        ))?;
        Ok(url)
    }

    /// `{scheme}://{registry}/v2/auth?service={registry}&scope=repository:{image_path}:pull`
    pub fn auth_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}://{}/v2/auth", self.scheme, self.config.url))?;
        url.query_pairs_mut()
            .append_pair("service", &self.config.url)
            .append_pair("scope", &format!("repository:{}:pull", self.config.image_path));
        Ok(url)
    }
}

#[async_trait]
impl TagChecker for RegistryClient {
    async fn is_tag_exist(&self, tag: &str) -> Result<bool> {
        RegistryClient::is_tag_exist(self, tag).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(plain_http: bool) -> RegistryClient {
        RegistryClient::builder(RegistryConfig::for_registry("ghcr.io", "org/app"))
            .with_plain_http(plain_http)
            .build()
            .unwrap()
    }

    #[test]
    fn manifest_url_layout() {
        let url = client(false).manifest_url("v1").unwrap();
        assert_eq!(url.as_str(), "https://ghcr.io/v2/org/app/manifests/v1");

        let url = client(true).manifest_url("v1").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn auth_url_carries_service_and_scope() {
        let url = client(false).auth_url().unwrap();
        assert_eq!(url.path(), "/v2/auth");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("service".to_string(), "ghcr.io".to_string()),
                ("scope".to_string(), "repository:org/app:pull".to_string()),
            ]
        );
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = RegistryClient::builder(RegistryConfig::new("X", "", "app")).build();
        assert!(matches!(result, Err(RegistryError::Validation(_))));
    }

    #[test]
    fn default_credentials_are_anonymous() {
        let c = client(false);
        assert_eq!(c.credentials.registry_name, "GHCR_IO");
        assert!(c.credentials.is_empty());
    }

    #[test]
    fn credentials_for_another_registry_are_rejected() {
        let credentials = RegistryCredentials::anonymous("GHCR")
            .with_basic("u", "p")
            .with_github_token("xyz");
        let result = RegistryClient::builder(RegistryConfig::new("GHCR_IO", "ghcr.io", "org/app"))
            .with_credentials(credentials)
            .build();
        match result {
            Err(RegistryError::Validation(msg)) => {
                assert!(msg.contains("GHCR"));
                assert!(msg.contains("GHCR_IO"));
            }
            Err(other) => panic!("expected Validation, got {:?}", other),
            Ok(_) => panic!("expected mismatched credentials to be rejected"),
        }
    }

    #[test]
    fn from_env_keeps_config_and_matching_credentials() {
        let config = RegistryConfig::new("TAG_CHECK_UNSET_REGISTRY", "registry.invalid", "org/app");
        let client = RegistryClient::from_env(config.clone()).unwrap();
        assert_eq!(client.config(), &config);
        assert_eq!(client.credentials.registry_name, "TAG_CHECK_UNSET_REGISTRY");
        assert!(client.credentials.is_empty());
    }

    #[tokio::test]
    async fn empty_tag_is_rejected() {
        let result = client(false).is_tag_exist("").await;
        assert!(matches!(result, Err(RegistryError::Validation(_))));
    }
}
