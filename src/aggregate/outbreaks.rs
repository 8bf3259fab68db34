//! Outbreak aggregation and filtering.
//!
//! This module provides the pure transformations that turn a flat,
//! possibly redundant list of outbreak records into the deduplicated
//! summaries driving the map and list views. All functions here allocate
//! fresh output and never mutate their input; derived views are
//! recomputed wholesale whenever the input or active filter changes.

use crate::models::{AggregatedLocation, DiseaseGroup, OutbreakRecord, Severity};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::warn;

/// Merge records into one entry per distinct disease+country pair.
///
/// The first record for a key seeds the accumulator; later records add
/// their case counts, bump the contributing-record counter, escalate
/// severity (never downgrade), and backfill coordinates when the seed
/// lacked them. Records with no usable disease/country key are dropped
/// with a warning rather than merged under an empty key.
///
/// Output is sorted by severity descending, then total cases descending,
/// with disease/country as a deterministic tiebreak.
pub fn aggregate_by_location(records: &[OutbreakRecord]) -> Vec<AggregatedLocation> {
    let mut by_key: HashMap<(String, String), AggregatedLocation> = HashMap::new();
    let mut dropped = 0usize;

    for record in records {
        if !record.has_key() {
            dropped += 1;
            continue;
        }

        let key = (
            record.disease.trim().to_string(),
            record.country.trim().to_string(),
        );
        let coords = record.coordinates();

        match by_key.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.total_cases += record.outbreak_count;
                entry.outbreak_count += 1;
                entry.severity = entry.severity.max(record.risk_level);
                if !entry.has_coordinates() {
                    if let Some((lat, lon)) = coords {
                        entry.latitude = Some(lat);
                        entry.longitude = Some(lon);
                    }
                }
            }
            Entry::Vacant(vacant) => {
                let (disease, country) = vacant.key().clone();
                vacant.insert(AggregatedLocation {
                    disease,
                    country,
                    latitude: coords.map(|(lat, _)| lat),
                    longitude: coords.map(|(_, lon)| lon),
                    total_cases: record.outbreak_count,
                    outbreak_count: 1,
                    severity: record.risk_level,
                });
            }
        }
    }

    if dropped > 0 {
        warn!(
            "Dropped {} record(s) lacking a disease/country key",
            dropped
        );
    }

    let mut locations: Vec<AggregatedLocation> = by_key.into_values().collect();
    locations.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.total_cases.cmp(&a.total_cases))
            .then_with(|| a.disease.cmp(&b.disease))
            .then_with(|| a.country.cmp(&b.country))
    });

    locations
}

/// Roll aggregated locations up into one group per disease.
///
/// Each group collects its locations in input order, accumulates case
/// counts, gathers the distinct set of reporting countries, and escalates
/// `highest_severity` under the same one-directional ordering as
/// location-level aggregation. Output is sorted by total cases descending.
pub fn group_by_disease(locations: &[AggregatedLocation]) -> Vec<DiseaseGroup> {
    let mut by_disease: HashMap<String, DiseaseGroup> = HashMap::new();

    for location in locations {
        let group = by_disease
            .entry(location.disease.clone())
            .or_insert_with(|| DiseaseGroup {
                disease: location.disease.clone(),
                locations: Vec::new(),
                total_cases: 0,
                countries: Default::default(),
                highest_severity: Severity::Unknown,
            });

        group.locations.push(location.clone());
        group.total_cases += location.total_cases;
        group.countries.insert(location.country.clone());
        group.highest_severity = group.highest_severity.max(location.severity);
    }

    let mut groups: Vec<DiseaseGroup> = by_disease.into_values().collect();
    groups.sort_by(|a, b| {
        b.total_cases
            .cmp(&a.total_cases)
            .then_with(|| a.disease.cmp(&b.disease))
    });

    groups
}

/// Apply the dashboard filters to a list of aggregated locations.
///
/// An exact-match disease filter is applied first, then a case-insensitive
/// substring match against disease, country, and display name. Relative
/// order is preserved; when both filters are empty the input is returned
/// unchanged.
pub fn filter_locations(
    locations: &[AggregatedLocation],
    query: &str,
    selected_disease: Option<&str>,
) -> Vec<AggregatedLocation> {
    let query = query.trim().to_lowercase();

    locations
        .iter()
        .filter(|loc| match selected_disease {
            Some(disease) => loc.disease == disease,
            None => true,
        })
        .filter(|loc| {
            if query.is_empty() {
                return true;
            }
            loc.disease.to_lowercase().contains(&query)
                || loc.country.to_lowercase().contains(&query)
                || loc.display_name().to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// The subset of locations that can be placed on the map.
///
/// Entries without coordinates stay in the aggregate for count purposes
/// but are excluded here.
pub fn map_markers(locations: &[AggregatedLocation]) -> Vec<AggregatedLocation> {
    locations
        .iter()
        .filter(|loc| loc.has_coordinates())
        .cloned()
        .collect()
}

/// Count records that would be dropped for lacking a usable key.
pub fn count_unkeyed(records: &[OutbreakRecord]) -> usize {
    records.iter().filter(|r| !r.has_key()).count()
}
