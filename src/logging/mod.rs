//! Logging and output control
//!
//! This module provides the [`Logger`] used by the client and the CLI. It supports
//! quiet, normal and verbose output, and can report elapsed time for a check.

use std::time::{Duration, Instant};

/// Logger responsible for all user-visible output
#[derive(Debug, Clone)]
pub struct Logger {
    pub verbose: bool,
    pub quiet: bool,
    pub start_time: Option<Instant>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new_quiet()
    }
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            quiet: false,
            start_time: Some(Instant::now()),
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            verbose: false,
            quiet: true,
            start_time: Some(Instant::now()),
        }
    }

    /// Main section heading
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n=== {} ===", title);
        }
    }

    pub fn debug(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("🐛 DEBUG: {}", message);
        }
    }

    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("📝 {}", message);
        }
    }

    /// Information message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("ℹ️  {}", message);
        }
    }

    /// Success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("✅ {}", message);
        }
    }

    /// Warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("⚠️  WARNING: {}", message);
        }
    }

    /// Error message, printed even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("❌ ERROR: {}", message);
    }

    /// Detailed information (only shown in verbose mode)
    pub fn detail(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("   {}", message);
        }
    }

    /// Key-value pair summary display
    pub fn summary_kv(&self, title: &str, items: &[(&str, String)]) {
        if !self.quiet {
            println!("\n--- {} ---", title);
            for (key, value) in items {
                println!("  {}: {}", key, value);
            }
        }
    }

    /// Format duration in human-readable format
    pub fn format_duration(&self, duration: Duration) -> String {
        let millis = duration.as_millis();
        if millis < 1000 {
            format!("{}ms", millis)
        } else if duration.as_secs() < 60 {
            format!("{:.1}s", duration.as_secs_f64())
        } else {
            let secs = duration.as_secs();
            format!("{}m{}s", secs / 60, secs % 60)
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|start| start.elapsed())
    }
}

/// Length-only description of a secret, safe to log
pub fn describe_secret(secret: &str) -> String {
    format!("<{} chars>", secret.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_logger_is_default() {
        let logger = Logger::default();
        assert!(logger.quiet);
        assert!(!logger.verbose);
    }

    #[test]
    fn durations_are_human_readable() {
        let logger = Logger::new(false);
        assert_eq!(logger.format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(logger.format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(logger.format_duration(Duration::from_secs(125)), "2m5s");
    }

    #[test]
    fn secrets_are_described_by_length() {
        assert_eq!(describe_secret("abc"), "<3 chars>");
    }
}
