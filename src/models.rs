//! Data models for the outbreak dashboard.
//!
//! This module contains all the core data structures used throughout
//! the application for representing raw outbreak records, aggregated
//! views, and dashboard reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Treat an explicit JSON `null` the same as an absent field.
///
/// Feeds commonly encode "absent" as `null`; a record carrying one must
/// degrade to the field default, not abort deserialization.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Risk level of an outbreak.
///
/// Declared in ascending order so the derived `Ord` gives the total
/// ordering `Unknown < Low < Moderate < High`. Unrecognized input
/// strings map to `Unknown` rather than being coerced to `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    /// Unrecognized or missing risk level - ranked below every known level
    Unknown,
    /// Low risk - sporadic cases, contained spread
    Low,
    /// Moderate risk - sustained local transmission
    Moderate,
    /// High risk - widespread or fast-growing outbreak
    High,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Unknown
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Unknown => write!(f, "Unknown"),
            Severity::Low => write!(f, "Low"),
            Severity::Moderate => write!(f, "Moderate"),
            Severity::High => write!(f, "High"),
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::from(s.as_str())
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" | "severe" | "critical" => Severity::High,
            "moderate" | "medium" => Severity::Moderate,
            "low" | "minor" => Severity::Low,
            _ => Severity::Unknown,
        }
    }
}

impl Severity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Unknown => "⚪",
            Severity::Low => "🟢",
            Severity::Moderate => "🟠",
            Severity::High => "🔴",
        }
    }
}

/// Geographic point, as nested under a `location` object in some API
/// responses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoPoint {
    /// Latitude in degrees.
    #[serde(alias = "lat")]
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: Option<f64>,
}

/// One reported outbreak data point, as received from the remote source
/// or a local fixture.
///
/// Every field degrades on absence rather than failing deserialization:
/// missing counts become zero, missing risk levels become `Unknown`, and
/// missing coordinates simply omit the record from map placement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutbreakRecord {
    /// Disease identifier (free text, not enumerated).
    #[serde(deserialize_with = "null_as_default")]
    pub disease: String,
    /// Country where the outbreak was reported.
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    /// Latitude in degrees, when reported at the top level.
    pub latitude: Option<f64>,
    /// Longitude in degrees, when reported at the top level.
    pub longitude: Option<f64>,
    /// Number of reported cases.
    #[serde(alias = "cases", deserialize_with = "null_as_default")]
    pub outbreak_count: u64,
    /// Reported risk level.
    #[serde(alias = "severity", deserialize_with = "null_as_default")]
    pub risk_level: Severity,
    /// Coordinates nested under a `location` object (alternate API shape).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl OutbreakRecord {
    /// Returns the record's coordinates, preferring top-level fields over
    /// a nested `location` object. `None` when neither shape is usable.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self
                .location
                .and_then(|loc| match (loc.latitude, loc.longitude) {
                    (Some(lat), Some(lon)) => Some((lat, lon)),
                    _ => None,
                }),
        }
    }

    /// A record carries a usable aggregation key when both disease and
    /// country are non-empty after trimming. Records failing this check
    /// are dropped (with a warning) by the aggregator.
    pub fn has_key(&self) -> bool {
        !self.disease.trim().is_empty() && !self.country.trim().is_empty()
    }
}

/// Merged summary of all records sharing a disease+country pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedLocation {
    /// Disease identifier.
    pub disease: String,
    /// Country name.
    pub country: String,
    /// Latitude of the first contributing record that carried coordinates.
    pub latitude: Option<f64>,
    /// Longitude of the first contributing record that carried coordinates.
    pub longitude: Option<f64>,
    /// Sum of case counts across all contributing records.
    pub total_cases: u64,
    /// Number of source records merged into this entry.
    pub outbreak_count: usize,
    /// Highest risk level observed among contributing records.
    pub severity: Severity,
}

impl AggregatedLocation {
    /// Human-readable name used for list rows and marker labels.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.disease, self.country)
    }

    /// Whether this entry can be placed on the map.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Per-disease rollup of aggregated locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseGroup {
    /// Disease identifier.
    pub disease: String,
    /// Locations reporting this disease, in aggregation order.
    pub locations: Vec<AggregatedLocation>,
    /// Sum of case counts across all locations.
    pub total_cases: u64,
    /// Distinct countries reporting this disease.
    pub countries: BTreeSet<String>,
    /// Highest risk level across all locations.
    pub highest_severity: Severity,
}

/// Counts of aggregated locations per severity band.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeveritySummary {
    /// Total number of aggregated locations.
    pub total: usize,
    /// Locations at high severity.
    pub high: usize,
    /// Locations at moderate severity.
    pub moderate: usize,
    /// Locations at low severity.
    pub low: usize,
    /// Locations with no recognized severity.
    pub unknown: usize,
    /// Sum of case counts across all locations.
    pub total_cases: u64,
}

impl SeveritySummary {
    /// Creates a summary from a list of aggregated locations.
    pub fn from_locations(locations: &[AggregatedLocation]) -> Self {
        let mut summary = Self::default();
        summary.total = locations.len();

        for location in locations {
            match location.severity {
                Severity::High => summary.high += 1,
                Severity::Moderate => summary.moderate += 1,
                Severity::Low => summary.low += 1,
                Severity::Unknown => summary.unknown += 1,
            }
            summary.total_cases += location.total_cases;
        }

        summary
    }
}

/// Metadata about a dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// URL or file path the records were loaded from.
    pub source: String,
    /// Date and time the data was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Number of records received from the source.
    pub records_received: usize,
    /// Number of records dropped for lacking a usable disease/country key.
    pub records_dropped: usize,
    /// Number of aggregated disease+country entries.
    pub locations: usize,
    /// Number of distinct diseases.
    pub diseases: usize,
    /// Time spent fetching and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// The complete dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Severity band counts across all locations.
    pub summary: SeveritySummary,
    /// Aggregated locations, sorted by severity then case count.
    pub locations: Vec<AggregatedLocation>,
    /// Per-disease rollups, sorted by case count.
    pub groups: Vec<DiseaseGroup>,
}
