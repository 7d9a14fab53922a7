//! Error handling module for registry tag checks

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// Transport level failure (connection, DNS, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Registry answered with a status code we cannot interpret
    #[error("Unexpected response from registry {endpoint} API: {status}")]
    UnexpectedStatus { endpoint: &'static str, status: u16 },
    #[error("Could not get credentials for {registry}")]
    MissingCredentials { registry: String },
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl RegistryError {
    pub fn unexpected_status(endpoint: &'static str, status: reqwest::StatusCode) -> Self {
        RegistryError::UnexpectedStatus {
            endpoint,
            status: status.as_u16(),
        }
    }

    /// True for failures caused by rejected or absent credentials
    pub fn is_auth_related(&self) -> bool {
        match self {
            RegistryError::MissingCredentials { .. } | RegistryError::Auth(_) => true,
            RegistryError::UnexpectedStatus { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }
}

impl From<url::ParseError> for RegistryError {
    fn from(err: url::ParseError) -> Self {
        RegistryError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
