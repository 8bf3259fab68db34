//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// EpiWatch - epidemic outbreak dashboard generator
///
/// Fetch outbreak records from a remote feed (or a local JSON fixture),
/// aggregate them by disease and country, and render a dashboard report
/// with alerts, map markers, and per-disease summaries.
///
/// Examples:
///   epiwatch --url https://feed.example.org
///   epiwatch --fixture fixtures/outbreaks.json --format json
///   epiwatch --url https://feed.example.org --disease Dengue --search india
///   epiwatch --url https://feed.example.org --alert-on high
///   epiwatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the outbreak feed
    ///
    /// Not required when using --fixture or --init-config.
    /// Can also be set via EPIWATCH_URL env var or .epiwatch.toml config.
    #[arg(short, long, value_name = "URL", env = "EPIWATCH_URL")]
    pub url: Option<String>,

    /// Endpoint path for the outbreak list
    ///
    /// Appended to the base URL. Defaults to /api/outbreaks.
    #[arg(long, value_name = "PATH")]
    pub endpoint: Option<String>,

    /// Local JSON fixture to load instead of fetching
    ///
    /// Accepts the same payload shapes as the remote feed.
    #[arg(short, long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Output file path for the report
    #[arg(
        short,
        long,
        default_value = "epiwatch_report.md",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Only include this disease (exact match)
    #[arg(short, long, value_name = "NAME")]
    pub disease: Option<String>,

    /// Case-insensitive search over disease, country, and display name
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Minimum severity to include in the report
    ///
    /// Locations below this level are filtered out. Values: high, moderate, low
    #[arg(long, value_name = "LEVEL")]
    pub min_severity: Option<SeverityLevel>,

    /// Exit with code 2 if any location is at or above this severity
    ///
    /// Useful for scheduled monitoring jobs. Values: high, moderate, low
    #[arg(long, value_name = "LEVEL")]
    pub alert_on: Option<SeverityLevel>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of retries on transient fetch failure
    #[arg(long, value_name = "COUNT")]
    pub retries: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .epiwatch.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: fetch and aggregate without writing a report
    ///
    /// Prints how many records and aggregates were produced and exits.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .epiwatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Severity level for --alert-on and --min-severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum SeverityLevel {
    Low,
    Moderate,
    High,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.url.is_none() && self.fixture.is_none() {
            return Err("Either --url or --fixture must be provided".to_string());
        }

        if let Some(ref url) = self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Feed URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref fixture) = self.fixture {
            if !fixture.exists() {
                return Err(format!("Fixture file does not exist: {}", fixture.display()));
            }
            if !fixture.is_file() {
                return Err(format!("Fixture path is not a file: {}", fixture.display()));
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            url: Some("https://feed.example.org".to_string()),
            endpoint: None,
            fixture: None,
            output: PathBuf::from("report.md"),
            format: OutputFormat::Markdown,
            disease: None,
            search: None,
            min_severity: None,
            alert_on: None,
            timeout: None,
            retries: None,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_requires_source() {
        let mut args = make_args();
        args.url = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.url = Some("ftp://feed.example.org".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_fixture() {
        let mut args = make_args();
        args.url = None;
        args.fixture = Some(PathBuf::from("does/not/exist.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_severity_level_ordering() {
        assert!(SeverityLevel::Low < SeverityLevel::Moderate);
        assert!(SeverityLevel::Moderate < SeverityLevel::High);
    }
}
