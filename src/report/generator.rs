//! Markdown and JSON dashboard rendering.
//!
//! This module turns the aggregated outbreak data into the dashboard
//! document: metadata, severity summary, active alerts, map markers,
//! and per-disease sections.

use crate::aggregate::map_markers;
use crate::config::ReportConfig;
use crate::models::{AggregatedLocation, DiseaseGroup, Report, ReportMetadata, Severity, SeveritySummary};
use anyhow::Result;

/// Generate a complete Markdown dashboard report.
pub fn generate_markdown_report(report: &Report, config: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# EpiWatch Outbreak Dashboard\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Summary section
    output.push_str(&generate_summary_section(&report.summary));

    // Active alerts
    output.push_str(&generate_alerts_section(&report.locations, config.max_alerts));

    // Map markers
    if config.include_map_markers {
        output.push_str(&generate_markers_section(&report.locations));
    }

    // Per-disease sections
    if config.include_disease_groups {
        output.push_str(&generate_groups_section(&report.groups));
    }

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report (pretty-printed).
pub fn generate_json_report(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Fetched:** {}\n",
        metadata.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Records Received:** {}\n",
        metadata.records_received
    ));
    if metadata.records_dropped > 0 {
        section.push_str(&format!(
            "- **Records Dropped (no disease/country):** {}\n",
            metadata.records_dropped
        ));
    }
    section.push_str(&format!("- **Locations:** {}\n", metadata.locations));
    section.push_str(&format!("- **Diseases:** {}\n", metadata.diseases));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the severity summary section.
fn generate_summary_section(summary: &SeveritySummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!(
        "**{}** outbreak locations, **{}** total cases.\n\n",
        summary.total, summary.total_cases
    ));
    section.push_str(&format!(
        "| {} High | {} Moderate | {} Low | {} Unknown |\n",
        Severity::High.emoji(),
        Severity::Moderate.emoji(),
        Severity::Low.emoji(),
        Severity::Unknown.emoji()
    ));
    section.push_str("|---|---|---|---|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        summary.high, summary.moderate, summary.low, summary.unknown
    ));

    section
}

/// Generate the active alerts section (highest severity first, capped).
fn generate_alerts_section(locations: &[AggregatedLocation], max_alerts: usize) -> String {
    let mut section = String::new();

    section.push_str("## Active Alerts\n\n");

    let alerts: Vec<&AggregatedLocation> = locations
        .iter()
        .filter(|l| l.severity >= Severity::Moderate)
        .take(max_alerts)
        .collect();

    if alerts.is_empty() {
        section.push_str("No locations at moderate or high severity.\n\n");
        return section;
    }

    for location in alerts {
        section.push_str(&format!(
            "- {} **{}** — {} cases across {} report(s), severity {}\n",
            location.severity.emoji(),
            location.display_name(),
            location.total_cases,
            location.outbreak_count,
            location.severity
        ));
    }
    section.push('\n');

    section
}

/// Generate the map markers table (locations with coordinates only).
fn generate_markers_section(locations: &[AggregatedLocation]) -> String {
    let mut section = String::new();

    section.push_str("## Map Markers\n\n");

    let markers = map_markers(locations);
    if markers.is_empty() {
        section.push_str("No locations carry coordinates.\n\n");
        return section;
    }

    section.push_str("| Location | Latitude | Longitude | Cases | Severity |\n");
    section.push_str("|---|---|---|---|---|\n");

    for marker in &markers {
        section.push_str(&format!(
            "| {} | {:.4} | {:.4} | {} | {} {} |\n",
            marker.display_name(),
            marker.latitude.unwrap_or(0.0),
            marker.longitude.unwrap_or(0.0),
            marker.total_cases,
            marker.severity.emoji(),
            marker.severity
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-disease group sections.
fn generate_groups_section(groups: &[DiseaseGroup]) -> String {
    let mut section = String::new();

    section.push_str("## Diseases\n\n");

    if groups.is_empty() {
        section.push_str("No outbreak data available.\n\n");
        return section;
    }

    for group in groups {
        section.push_str(&format!(
            "### {} {}\n\n",
            group.highest_severity.emoji(),
            group.disease
        ));
        section.push_str(&format!(
            "{} cases in {} countr{}.\n\n",
            group.total_cases,
            group.countries.len(),
            if group.countries.len() == 1 { "y" } else { "ies" }
        ));

        for location in &group.locations {
            section.push_str(&format!(
                "- {}: {} cases ({} report(s)), severity {}\n",
                location.country, location.total_cases, location.outbreak_count, location.severity
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by EpiWatch v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}
