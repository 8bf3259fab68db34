//! EpiWatch - Epidemic Outbreak Dashboard Generator
//!
//! A CLI tool that fetches outbreak records from a remote feed (or a
//! local JSON fixture), aggregates them by disease and country, and
//! renders dashboard reports with alerts, map markers, and trends.
//!
//! Exit codes:
//!   0 - Success (no locations above threshold, or no --alert-on set)
//!   1 - Runtime error (fetch, config, write failure, etc.)
//!   2 - Locations found at or above --alert-on severity

mod aggregate;
mod api;
mod app;
mod cli;
mod config;
mod models;
mod report;

use anyhow::{Context, Result};
use app::AppState;
use chrono::Utc;
use cli::{Args, OutputFormat, SeverityLevel};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{OutbreakRecord, Report, ReportMetadata, Severity, SeveritySummary};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("EpiWatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Build the dashboard
    match run_dashboard(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard generation failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .epiwatch.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".epiwatch.toml");

    if path.exists() {
        eprintln!("⚠️  .epiwatch.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .epiwatch.toml")?;

    println!("✅ Created .epiwatch.toml with default settings.");
    println!("   Edit it to customize the feed URL, timeout, and report sections.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete dashboard workflow. Returns exit code (0 or 2).
async fn run_dashboard(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Load the outbreak records
    let (records, source) = load_records(&args, &config).await?;
    info!("Loaded {} records from {}", records.len(), source);

    // Step 2: Aggregate by disease+country
    let dropped = aggregate::count_unkeyed(&records);
    let locations = aggregate::aggregate_by_location(&records);
    info!(
        "Aggregated {} records into {} locations ({} dropped)",
        records.len(),
        locations.len(),
        dropped
    );

    // Step 3: Apply the dashboard filters
    let mut state = AppState::new();
    if let Some(ref search) = args.search {
        state.set_search(search.clone());
    }
    state.select_disease(args.disease.clone());

    let mut visible = state.visible_locations(&locations);

    if let Some(min_level) = args.min_severity {
        let min_severity = level_to_severity(min_level);
        visible.retain(|l| l.severity >= min_severity);
    }

    if state.has_filters() || args.min_severity.is_some() {
        info!(
            "Filters reduced {} locations to {}",
            locations.len(),
            visible.len()
        );
    }

    // Handle --dry-run: report counts and exit
    if args.dry_run {
        return handle_dry_run(&records, &visible, dropped);
    }

    // Step 4: Group by disease and summarize
    let groups = aggregate::group_by_disease(&visible);
    let summary = SeveritySummary::from_locations(&visible);

    // Step 5: Build the report
    if !args.quiet {
        println!("\n📝 Generating report...");
    }

    let duration = start_time.elapsed().as_secs_f64();
    let metadata = ReportMetadata {
        source,
        fetched_at: Utc::now(),
        records_received: records.len(),
        records_dropped: dropped,
        locations: visible.len(),
        diseases: groups.len(),
        duration_seconds: duration,
    };

    let dashboard = Report {
        metadata,
        summary: summary.clone(),
        locations: visible.clone(),
        groups,
    };

    // Step 6: Render and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&dashboard)?,
        OutputFormat::Markdown => report::generate_markdown_report(&dashboard, &config.report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    // Print summary (suppressed in quiet mode)
    if !args.quiet {
        println!("\n{}", render_summary(&summary, dropped, duration));
        println!(
            "\n✅ Dashboard complete! Report saved to: {}",
            args.output.display()
        );
    }

    // Check --alert-on threshold
    if let Some(alert_level) = args.alert_on {
        let threshold = level_to_severity(alert_level);
        let has_alerts = visible.iter().any(|l| l.severity >= threshold);

        if has_alerts {
            eprintln!(
                "\n⛔ Outbreaks found at or above {:?} severity. Alerting (exit code 2).",
                alert_level
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Load records from the configured source (fixture or remote feed).
async fn load_records(args: &Args, config: &Config) -> Result<(Vec<OutbreakRecord>, String)> {
    // Use local fixture if specified
    if let Some(ref fixture) = args.fixture {
        info!("Loading fixture: {}", fixture.display());
        let records = api::load_fixture(fixture)?;
        return Ok((records, fixture.display().to_string()));
    }

    // Fetch from the remote feed
    let api_config = api::ApiConfig {
        base_url: config.api.base_url.clone(),
        endpoint: config.api.endpoint.clone(),
        timeout_seconds: config.api.timeout_seconds,
        retries: config.api.retries,
    };
    let url = api_config.outbreaks_url();

    if !args.quiet {
        println!("📥 Fetching outbreak feed: {}", url);
    }

    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let client = api::OutbreakClient::new(api_config)?;
    let result = client.fetch_outbreaks().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let records = result.with_context(|| format!("Failed to fetch outbreak feed from {}", url))?;

    if records.is_empty() {
        warn!("Outbreak feed returned no records");
    }

    Ok((records, url))
}

/// Handle --dry-run: print aggregation counts, exit.
fn handle_dry_run(
    records: &[OutbreakRecord],
    locations: &[models::AggregatedLocation],
    dropped: usize,
) -> Result<i32> {
    println!("\n🔍 Dry run: aggregation only (no report written)...\n");
    println!("   Records received: {}", records.len());
    println!("   Records dropped:  {}", dropped);
    println!("   Locations:        {}", locations.len());

    let markers = aggregate::map_markers(locations);
    println!("   Map markers:      {}", markers.len());

    let groups = aggregate::group_by_disease(locations);
    println!("   Diseases:         {}", groups.len());

    println!("\n✅ Dry run complete. No report was written.");
    Ok(0)
}

/// Render the console summary block printed after a successful run.
fn render_summary(summary: &SeveritySummary, dropped: usize, duration: f64) -> String {
    let mut lines = vec![
        "📊 Outbreak Summary:".to_string(),
        format!("   Locations: {}", summary.total),
        format!("   Total cases: {}", summary.total_cases),
        format!(
            "   - 🔴 High: {} | 🟠 Moderate: {} | 🟢 Low: {} | ⚪ Unknown: {}",
            summary.high, summary.moderate, summary.low, summary.unknown
        ),
    ];
    if dropped > 0 {
        lines.push(format!(
            "   Dropped records (no disease/country): {}",
            dropped
        ));
    }
    lines.push(format!("   Duration: {:.1}s", duration));
    lines.join("\n")
}

/// Convert a CLI severity level to a model severity for comparison.
fn level_to_severity(level: SeverityLevel) -> Severity {
    match level {
        SeverityLevel::Low => Severity::Low,
        SeverityLevel::Moderate => Severity::Moderate,
        SeverityLevel::High => Severity::High,
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .epiwatch.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_summary() {
        let summary = SeveritySummary {
            total: 3,
            high: 1,
            moderate: 1,
            low: 1,
            unknown: 0,
            total_cases: 170,
        };

        let text = render_summary(&summary, 0, 1.25);
        assert!(text.contains("Locations: 3"));
        assert!(text.contains("Total cases: 170"));
        assert!(text.contains("Duration: 1.2s"));
        assert!(!text.contains("Dropped records"));

        let text = render_summary(&summary, 2, 1.25);
        assert!(text.contains("Dropped records (no disease/country): 2"));
    }

    #[test]
    fn test_level_to_severity() {
        assert_eq!(level_to_severity(SeverityLevel::Low), Severity::Low);
        assert_eq!(
            level_to_severity(SeverityLevel::Moderate),
            Severity::Moderate
        );
        assert_eq!(level_to_severity(SeverityLevel::High), Severity::High);
    }
}
