//! Command-line argument parsing

use crate::config::{ImageReference, RegistryConfig, registry_env_name};
use crate::error::{RegistryError, Result};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "tag-exists")]
#[command(about = "Check whether a tag exists for an image in an OCI/Docker registry")]
#[command(version)]
pub struct Args {
    /// Image reference
    #[arg(help = "Image reference: registry/path:tag (e.g. ghcr.io/org/app:v1)")]
    pub image: Option<String>,

    /// Registry host
    #[arg(
        long = "registry",
        short = 'r',
        conflicts_with = "image",
        requires = "image_path",
        help = "Registry host, used instead of an image reference"
    )]
    pub registry: Option<String>,

    #[arg(long = "image-path", short = 'i', conflicts_with = "image", help = "Repository path inside the registry")]
    pub image_path: Option<String>,

    #[arg(long = "tag", short = 't', conflicts_with = "image", default_value = "latest", help = "Tag to look for")]
    pub tag: String,

    /// Credential variable prefix override
    #[arg(
        long = "registry-name",
        short = 'n',
        help = "Prefix for {NAME}_TOKEN/_AUTH/_USER/_PASSWORD; derived from the registry host when omitted"
    )]
    pub registry_name: Option<String>,

    /// Timeout in seconds for each request
    #[arg(long = "timeout", default_value = "30", help = "Timeout for network operations in seconds")]
    pub timeout: u64,

    /// Skip TLS verification
    #[arg(long = "skip-tls", short = 'k', help = "Skip TLS certificate verification")]
    pub skip_tls: bool,

    #[arg(long = "plain-http", help = "Use http:// instead of https://")]
    pub plain_http: bool,

    #[arg(long = "verbose", short = 'v', conflicts_with = "quiet", help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long = "quiet", short = 'q', help = "Only print the result")]
    pub quiet: bool,

    #[arg(long = "output", short = 'o', value_enum, default_value = "text", help = "Output format")]
    pub output: OutputFormat,
}

/// What the CLI was asked to check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTarget {
    pub config: RegistryConfig,
    pub tag: String,
}

impl Args {
    /// Validate arguments and resolve them into a registry config and tag
    pub fn validate(&self) -> Result<CheckTarget> {
        if self.timeout == 0 {
            return Err(RegistryError::Validation("Timeout must be greater than 0".to_string()));
        }

        let (registry, image_path, tag) = match (&self.image, &self.registry, &self.image_path) {
            (Some(image), _, _) => {
                let reference = ImageReference::parse(image)?;
                (reference.registry, reference.image_path, reference.tag)
            }
            (None, Some(registry), Some(image_path)) => {
                (registry.clone(), image_path.clone(), self.tag.clone())
            }
            _ => {
                return Err(RegistryError::Validation(
                    "Either an image reference or --registry with --image-path is required".to_string(),
                ));
            }
        };

        let name = self
            .registry_name
            .clone()
            .unwrap_or_else(|| registry_env_name(&registry));

        let config = RegistryConfig::new(name, registry, image_path);
        config.validate()?;

        if tag.is_empty() {
            return Err(RegistryError::Validation("Tag cannot be empty".to_string()));
        }

        Ok(CheckTarget { config, tag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tag-exists").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn image_reference_resolves_target() {
        let target = parse(&["ghcr.io/org/app:v1"]).validate().unwrap();
        assert_eq!(target.config.name, "GHCR_IO");
        assert_eq!(target.config.url, "ghcr.io");
        assert_eq!(target.config.image_path, "org/app");
        assert_eq!(target.tag, "v1");
    }

    #[test]
    fn explicit_flags_resolve_target() {
        let target = parse(&["-r", "quay.io", "-i", "team/tool", "-t", "2.0", "-n", "QUAY"])
            .validate()
            .unwrap();
        assert_eq!(target.config.name, "QUAY");
        assert_eq!(target.config.url, "quay.io");
        assert_eq!(target.tag, "2.0");
    }

    #[test]
    fn missing_target_is_rejected() {
        assert!(parse(&[]).validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(parse(&["--timeout", "0", "ghcr.io/org/app"]).validate().is_err());
    }

    #[test]
    fn image_conflicts_with_registry_flag() {
        let result = Args::try_parse_from(["tag-exists", "ghcr.io/org/app", "-r", "quay.io", "-i", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn output_format_parses() {
        assert_eq!(parse(&["-o", "json", "ghcr.io/org/app"]).output, OutputFormat::Json);
    }
}
