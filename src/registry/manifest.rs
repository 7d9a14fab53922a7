//! Manifest existence check
//!
//! Issues `HEAD /v2/{name}/manifests/{reference}` and maps the status code:
//! 200 means the tag exists, 404 means it does not, anything else is an error.

use crate::error::{RegistryError, Result};
use crate::logging::Logger;
use reqwest::{Client, StatusCode};
use url::Url;

/// Definitive answer from the manifest endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestStatus {
    Found,
    NotFound,
}

impl ManifestStatus {
    pub fn exists(self) -> bool {
        matches!(self, ManifestStatus::Found)
    }

    fn from_status(status: StatusCode) -> Result<Self> {
        match status {
            StatusCode::OK => Ok(ManifestStatus::Found),
            StatusCode::NOT_FOUND => Ok(ManifestStatus::NotFound),
            other => Err(RegistryError::unexpected_status("manifest", other)),
        }
    }
}

/// Check the manifest URL, optionally presenting a bearer token
pub async fn check_manifest(
    client: &Client,
    url: Url,
    bearer: Option<&str>,
    output: &Logger,
) -> Result<ManifestStatus> {
    output.detail(&format!(
        "HEAD {} ({})",
        url,
        if bearer.is_some() { "bearer" } else { "anonymous" }
    ));

    let mut request = client.head(url);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    output.detail(&format!("Manifest response status: {}", response.status()));

    ManifestStatus::from_status(response.status())
}
