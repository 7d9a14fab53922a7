//! Registry Tag Check Library
//!
//! Checks whether a tag exists for an image in an OCI/Docker registry. Public
//! images are answered anonymously; otherwise a bearer token is obtained from
//! environment-derived credentials and the check is repeated.

pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;

pub use common::TagChecker;
pub use config::{ImageReference, RegistryConfig, RegistryCredentials, registry_env_name};
pub use error::{RegistryError, Result};
pub use logging::Logger;
pub use registry::{RegistryClient, RegistryClientBuilder};
