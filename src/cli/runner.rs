//! Runner wiring parsed arguments to the registry client

use crate::cli::args::{Args, CheckTarget, OutputFormat};
use crate::common::TagChecker;
use crate::config::{GHCR_REGISTRY_NAME, GITHUB_TOKEN_ENV, RegistryCredentials};
use crate::error::Result;
use crate::logging::Logger;
use crate::registry::RegistryClientBuilder;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckReport {
    pub registry: String,
    pub image_path: String,
    pub tag: String,
    pub exists: bool,
}

impl CheckReport {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Text => format!(
                "{}/{}:{} {}",
                self.registry,
                self.image_path,
                self.tag,
                if self.exists { "exists" } else { "not found" }
            ),
            OutputFormat::Json => serde_json::to_string(self)?,
        })
    }
}

pub struct Runner {
    args: Args,
    output: Logger,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        // stdout carries only the JSON document in json mode
        let output = if args.quiet || args.output == OutputFormat::Json {
            Logger::new_quiet()
        } else {
            Logger::new(args.verbose)
        };
        Self { args, output }
    }

    pub fn output(&self) -> &Logger {
        &self.output
    }

    pub fn format(&self) -> OutputFormat {
        self.args.output
    }

    /// Which environment variables would supply credentials for the target
    pub fn credential_hint(&self) -> Option<String> {
        let name = self.args.validate().ok()?.config.name;
        let mut hint = format!(
            "Set {0}_TOKEN, {0}_AUTH or {0}_USER/{0}_PASSWORD for this registry",
            name
        );
        if name == GHCR_REGISTRY_NAME {
            hint.push_str(&format!(", or {}", GITHUB_TOKEN_ENV));
        }
        Some(hint)
    }

    pub async fn run(&self) -> Result<CheckReport> {
        let target = self.args.validate()?;

        self.output.section("Registry Tag Check");
        self.output.summary_kv(
            "Target",
            &[
                ("Registry", target.config.url.clone()),
                ("Credential prefix", target.config.name.clone()),
                ("Image", target.config.image_path.clone()),
                ("Tag", target.tag.clone()),
            ],
        );

        let credentials = RegistryCredentials::from_env(&target.config.name);
        if credentials.is_empty() {
            self.output
                .verbose("No credentials in environment, only anonymous access is possible");
        }

        let client = RegistryClientBuilder::new(target.config.clone())
            .with_credentials(credentials)
            .with_timeout(Duration::from_secs(self.args.timeout))
            .with_skip_tls(self.args.skip_tls)
            .with_plain_http(self.args.plain_http)
            .with_logger(self.output.clone())
            .build()?;

        let report = check(&client, &target).await?;
        if report.exists {
            self.output.success(&format!("Tag {} found", report.tag));
        } else {
            self.output.info(&format!("Tag {} not found", report.tag));
        }

        if let Some(elapsed) = self.output.elapsed() {
            self.output
                .verbose(&format!("Check completed in {}", self.output.format_duration(elapsed)));
        }
        Ok(report)
    }
}

/// Run one check through any [`TagChecker`]
pub async fn check(checker: &dyn TagChecker, target: &CheckTarget) -> Result<CheckReport> {
    let exists = checker.is_tag_exist(&target.tag).await?;
    Ok(CheckReport {
        registry: target.config.url.clone(),
        image_path: target.config.image_path.clone(),
        tag: target.tag.clone(),
        exists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::error::RegistryError;
    use async_trait::async_trait;
    use clap::Parser;

    struct FixedChecker(Option<bool>);

    #[async_trait]
    impl TagChecker for FixedChecker {
        async fn is_tag_exist(&self, _tag: &str) -> Result<bool> {
            self.0
                .ok_or_else(|| RegistryError::Auth("no bearer".to_string()))
        }
    }

    fn target() -> CheckTarget {
        CheckTarget {
            config: RegistryConfig::for_registry("ghcr.io", "org/app"),
            tag: "v1".to_string(),
        }
    }

    #[tokio::test]
    async fn check_builds_report() {
        let report = check(&FixedChecker(Some(true)), &target()).await.unwrap();
        assert!(report.exists);
        assert_eq!(report.render(OutputFormat::Text).unwrap(), "ghcr.io/org/app:v1 exists");
    }

    #[tokio::test]
    async fn check_propagates_errors() {
        assert!(check(&FixedChecker(None), &target()).await.is_err());
    }

    fn runner(argv: &[&str]) -> Runner {
        Runner::new(Args::try_parse_from(std::iter::once("tag-exists").chain(argv.iter().copied())).unwrap())
    }

    #[test]
    fn json_output_silences_logger() {
        assert!(runner(&["-o", "json", "ghcr.io/org/app:v1"]).output().quiet);
        assert!(runner(&["-o", "json", "-v", "ghcr.io/org/app:v1"]).output().quiet);
        assert!(!runner(&["ghcr.io/org/app:v1"]).output().quiet);
    }

    #[test]
    fn credential_hint_names_the_prefix() {
        let hint = runner(&["quay.io/team/tool"]).credential_hint().unwrap();
        assert_eq!(
            hint,
            "Set QUAY_IO_TOKEN, QUAY_IO_AUTH or QUAY_IO_USER/QUAY_IO_PASSWORD for this registry"
        );

        let hint = runner(&["ghcr.io/org/app"]).credential_hint().unwrap();
        assert!(hint.starts_with("Set GHCR_IO_TOKEN"));
        assert!(hint.ends_with("or GITHUB_TOKEN"));

        let hint = runner(&["-n", "MIRROR", "ghcr.io/org/app"]).credential_hint().unwrap();
        assert!(hint.contains("MIRROR_USER/MIRROR_PASSWORD"));
        assert!(!hint.contains("GITHUB_TOKEN"));

        assert!(runner(&[]).credential_hint().is_none());
    }

    #[test]
    fn json_report() {
        let report = CheckReport {
            registry: "ghcr.io".to_string(),
            image_path: "org/app".to_string(),
            tag: "v1".to_string(),
            exists: false,
        };
        let json: serde_json::Value = serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["exists"], false);
        assert_eq!(json["image_path"], "org/app");
    }
}
