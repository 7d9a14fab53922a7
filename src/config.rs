//! Configuration module for registry settings, image references and credentials

use crate::error::{RegistryError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Registry name that may fall back to `GITHUB_TOKEN`
pub const GHCR_REGISTRY_NAME: &str = "GHCR_IO";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Prefix for the credential environment variables, e.g. `GHCR_IO`
    pub name: String,
    /// Registry host, e.g. `ghcr.io` or `localhost:5000`
    pub url: String,
    /// Repository path inside the registry, e.g. `org/app`
    pub image_path: String,
}

impl RegistryConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>, image_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            image_path: image_path.into(),
        }
    }

    /// Build a config whose name is derived from the registry host
    pub fn for_registry(url: impl Into<String>, image_path: impl Into<String>) -> Self {
        let url = url.into();
        let name = registry_env_name(&url);
        Self::new(name, url, image_path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RegistryError::Validation("Registry name cannot be empty".to_string()));
        }
        if self.url.is_empty() {
            return Err(RegistryError::Validation("Registry URL cannot be empty".to_string()));
        }
        if self.url.contains("://") {
            return Err(RegistryError::Validation(format!(
                "Registry URL must be a bare host without scheme: {}",
                self.url
            )));
        }
        if self.image_path.is_empty() {
            return Err(RegistryError::Validation("Image path cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Derive the environment variable prefix for a registry host.
///
/// Uppercases the host and replaces every non-alphanumeric character with `_`,
/// so `ghcr.io` becomes `GHCR_IO` and `localhost:5000` becomes `LOCALHOST_5000`.
pub fn registry_env_name(registry_url: &str) -> String {
    registry_url
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Parsed `registry/path:tag` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub registry: String,
    pub image_path: String,
    pub tag: String,
}

impl ImageReference {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://");

        if reference.contains('@') {
            return Err(RegistryError::Validation(format!(
                "Digest references are not supported, expected registry/path:tag: {}",
                reference
            )));
        }

        let (registry, path) = match reference.find('/') {
            Some(pos) => (&reference[..pos], &reference[pos + 1..]),
            None => {
                return Err(RegistryError::Validation(format!(
                    "Invalid image reference format. Expected: registry/path:tag, got: {}",
                    reference
                )));
            }
        };

        // Only a colon after the last slash separates the tag; earlier ones belong to the path
        let last_slash = path.rfind('/').map(|p| p + 1).unwrap_or(0);
        let (image_path, tag) = match path[last_slash..].rfind(':') {
            Some(pos) => {
                let split = last_slash + pos;
                (&path[..split], &path[split + 1..])
            }
            None => (path, "latest"),
        };

        if registry.is_empty() {
            return Err(RegistryError::Validation("Registry cannot be empty".to_string()));
        }
        if image_path.is_empty() {
            return Err(RegistryError::Validation("Image path cannot be empty".to_string()));
        }
        if tag.is_empty() {
            return Err(RegistryError::Validation("Tag cannot be empty".to_string()));
        }

        Ok(ImageReference {
            registry: registry.to_string(),
            image_path: image_path.to_string(),
            tag: tag.to_string(),
        })
    }
}

/// Credential material for one registry, read once and injected into the client.
#[derive(Clone, Default)]
pub struct RegistryCredentials {
    pub registry_name: String,
    pub bearer_token: Option<String>,
    pub auth_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub github_token: Option<String>,
}

impl RegistryCredentials {
    /// No credentials at all; only anonymous access will work
    pub fn anonymous(registry_name: impl Into<String>) -> Self {
        Self {
            registry_name: registry_name.into(),
            ..Default::default()
        }
    }

    /// Read `{NAME}_TOKEN`, `{NAME}_AUTH`, `{NAME}_USER`, `{NAME}_PASSWORD`
    /// (and `GITHUB_TOKEN` for ghcr.io) from the process environment.
    pub fn from_env(registry_name: &str) -> Self {
        Self::from_lookup(registry_name, |key| env::var(key).ok())
    }

    /// Same as [`RegistryCredentials::from_env`] but against any key/value source.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(registry_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |suffix: &str| non_empty(lookup(&format!("{}_{}", registry_name, suffix)));

        let github_token = if registry_name == GHCR_REGISTRY_NAME {
            non_empty(lookup(GITHUB_TOKEN_ENV))
        } else {
            None
        };

        Self {
            registry_name: registry_name.to_string(),
            bearer_token: read("TOKEN"),
            auth_token: read("AUTH"),
            username: read("USER"),
            password: read("PASSWORD"),
            github_token,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = non_empty(Some(token.into()));
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = non_empty(Some(token.into()));
        self
    }

    pub fn with_basic(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = non_empty(Some(username.into()));
        self.password = non_empty(Some(password.into()));
        self
    }

    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = non_empty(Some(token.into()));
        self
    }

    /// Auth token for the token endpoint: the supplied one, or `base64(user:pass)`.
    pub fn auth_token(&self) -> Result<String> {
        if let Some(token) = &self.auth_token {
            return Ok(token.clone());
        }
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Ok(STANDARD.encode(format!("{}:{}", user, pass))),
            _ => Err(RegistryError::MissingCredentials {
                registry: self.registry_name.clone(),
            }),
        }
    }

    /// Bearer token derived from `GITHUB_TOKEN`, only for ghcr.io
    pub fn github_bearer_token(&self) -> Option<String> {
        if self.registry_name != GHCR_REGISTRY_NAME {
            return None;
        }
        self.github_token.as_ref().map(|t| STANDARD.encode(t))
    }

    pub fn is_empty(&self) -> bool {
        self.bearer_token.is_none()
            && self.auth_token.is_none()
            && (self.username.is_none() || self.password.is_none())
            && self.github_bearer_token().is_none()
    }
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("RegistryCredentials")
            .field("registry_name", &self.registry_name)
            .field("bearer_token", &redact(&self.bearer_token))
            .field("auth_token", &redact(&self.auth_token))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("github_token", &redact(&self.github_token))
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
