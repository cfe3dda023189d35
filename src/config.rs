//! Tunable scheduling constants.
//!
//! Everything that was a magic number or hard-coded label in the legacy
//! allocation rules lives here: loop guards, the special period counts
//! that switch allocation modes, cohort/program labels used by the room
//! category rules, and the campus geography behind building scoring.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for batch generation and room assignment.
///
/// `Default` reproduces the production values; override individual
/// fields with the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Upper bound on row-draw iterations per section. Protects against
    /// malformed catalogs (e.g. every row has zero usable periods).
    pub iteration_guard: u32,
    /// Total-period count that switches a subject to the paired-day path.
    pub long_duration_periods: i32,
    /// Total-period count packed four sections per rotating slot
    /// instead of two.
    pub high_density_periods: i32,
    /// Start period marking a row as remote: no physical room is
    /// assigned and no occupancy is recorded for it.
    pub remote_start_period: i32,
    /// Cohort year admitted to cohort-reserved rooms.
    pub newest_cohort: String,
    /// Cohort year confined to the legacy annex.
    pub legacy_cohort: String,
    /// Special-program label that routes to high-tier rooms. Any other
    /// non-empty special program gets no room at all.
    pub high_tier_program: String,
    /// Subject category that routes to language-lab rooms.
    pub english_category: String,
    /// Building preference order applied when no per-major preference
    /// is configured.
    pub default_preferred_buildings: Vec<String>,
    /// Ordinal position of each building along the campus axis; the
    /// distance between two buildings is the difference of positions.
    /// Unknown buildings sit at position 0.
    pub building_positions: HashMap<String, i32>,
    /// Lowercase markers identifying remote "rooms" in imported
    /// schedules, excluded from room-conflict grouping.
    pub remote_room_markers: Vec<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let mut building_positions = HashMap::new();
        building_positions.insert("A1".to_string(), 0);
        building_positions.insert("A2".to_string(), 1);
        building_positions.insert("A3".to_string(), 2);
        building_positions.insert("NT".to_string(), 3);

        Self {
            iteration_guard: 10_000,
            long_duration_periods: 60,
            high_density_periods: 14,
            remote_start_period: 12,
            newest_cohort: "2024".to_string(),
            legacy_cohort: "2022".to_string(),
            high_tier_program: "CLC".to_string(),
            english_category: "english".to_string(),
            default_preferred_buildings: vec![
                "A2".to_string(),
                "A1".to_string(),
                "A3".to_string(),
            ],
            building_positions,
            remote_room_markers: vec![
                "online".to_string(),
                "remote".to_string(),
                "zoom".to_string(),
                "meet".to_string(),
            ],
        }
    }
}

impl ScheduleConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-section iteration guard.
    pub fn with_iteration_guard(mut self, guard: u32) -> Self {
        self.iteration_guard = guard;
        self
    }

    /// Sets the long-duration (paired-day) period count.
    pub fn with_long_duration_periods(mut self, periods: i32) -> Self {
        self.long_duration_periods = periods;
        self
    }

    /// Sets the high-density period count.
    pub fn with_high_density_periods(mut self, periods: i32) -> Self {
        self.high_density_periods = periods;
        self
    }

    /// Sets the remote start period.
    pub fn with_remote_start_period(mut self, period: i32) -> Self {
        self.remote_start_period = period;
        self
    }

    /// Sets the cohort labels (newest, legacy).
    pub fn with_cohorts(
        mut self,
        newest: impl Into<String>,
        legacy: impl Into<String>,
    ) -> Self {
        self.newest_cohort = newest.into();
        self.legacy_cohort = legacy.into();
        self
    }

    /// Sets the high-tier program label.
    pub fn with_high_tier_program(mut self, label: impl Into<String>) -> Self {
        self.high_tier_program = label.into();
        self
    }

    /// Sets the default building preference order.
    pub fn with_default_preferred_buildings<I, S>(mut self, buildings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_preferred_buildings = buildings.into_iter().map(Into::into).collect();
        self
    }

    /// Places a building at an ordinal position on the campus axis.
    pub fn with_building_position(mut self, building: impl Into<String>, position: i32) -> Self {
        self.building_positions.insert(building.into(), position);
        self
    }

    /// Sets the remote-room markers (stored lowercase).
    pub fn with_remote_room_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remote_room_markers = markers
            .into_iter()
            .map(|m| m.into().to_lowercase())
            .collect();
        self
    }

    /// Ordinal position of a building (0 when unknown).
    pub fn building_position(&self, building: &str) -> i32 {
        self.building_positions.get(building).copied().unwrap_or(0)
    }
}
