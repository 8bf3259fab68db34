//! Application view state.
//!
//! Navigation and filter state live in one explicit struct passed down to
//! whatever renders the views, rather than in ambient globals. The current
//! screen is a tagged variant; filter changes are applied through methods
//! so derived data is always recomputed from scratch against the new state.

use crate::aggregate::filter_locations;
use crate::models::AggregatedLocation;

/// The screen currently being displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(dead_code)] // Variants are entered by interactive navigation
pub enum Screen {
    /// Overview dashboard with summary counts and alerts.
    #[default]
    Dashboard,
    /// World map with outbreak markers.
    Map,
    /// Flat alert list, filterable by search and disease.
    Alerts,
    /// Detail view for a single disease.
    DiseaseDetail(String),
    /// Profile and settings.
    Profile,
}

/// Navigation and filter state for the dashboard views.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Screen currently displayed.
    pub screen: Screen,
    /// Free-text search over disease, country, and display name.
    pub search_query: String,
    /// Exact-match disease filter, `None` for all diseases.
    pub selected_disease: Option<String>,
}

impl AppState {
    /// Create state showing the dashboard with no filters active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to another screen. Entering a disease detail screen also
    /// selects that disease as the active filter.
    #[allow(dead_code)] // Driven by interactive navigation
    pub fn navigate(&mut self, screen: Screen) {
        if let Screen::DiseaseDetail(ref disease) = screen {
            self.selected_disease = Some(disease.clone());
        }
        self.screen = screen;
    }

    /// Update the search query (called on every keystroke).
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Set or clear the disease filter.
    pub fn select_disease(&mut self, disease: Option<String>) {
        self.selected_disease = disease;
    }

    /// Clear both filters, keeping the current screen.
    #[allow(dead_code)] // Driven by interactive navigation
    pub fn clear_filters(&mut self) {
        self.search_query.clear();
        self.selected_disease = None;
    }

    /// Whether any filter is active.
    pub fn has_filters(&self) -> bool {
        !self.search_query.trim().is_empty() || self.selected_disease.is_some()
    }

    /// Apply the active filters to a list of aggregated locations.
    ///
    /// Always a full recomputation over the input; nothing is patched
    /// in place.
    pub fn visible_locations(&self, locations: &[AggregatedLocation]) -> Vec<AggregatedLocation> {
        filter_locations(
            locations,
            &self.search_query,
            self.selected_disease.as_deref(),
        )
    }
}
