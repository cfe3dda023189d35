//! Room inventory model.
//!
//! Rooms are managed externally; the scheduler only reads capacity,
//! building, category, and operational status at assignment time, and
//! asks the inventory to flip Available rooms to Occupied after a
//! commit.

use serde::{Deserialize, Serialize};

/// A physical teaching room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room code (e.g. "A2-301").
    pub code: String,
    /// Seat capacity.
    pub capacity: i32,
    /// Building the room belongs to (e.g. "A2").
    pub building: String,
    /// Which programs/cohorts the room serves.
    pub category: RoomCategory,
    /// Operational status, mutated externally and on commit.
    pub status: RoomStatus,
}

/// Room classification driving category-compatibility rules.
///
/// A closed set; raw configuration text maps in through
/// [`RoomCategory::from_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomCategory {
    /// Standard teaching room, the default for most subjects.
    General,
    /// Reserved for the newest student intake.
    NewestCohort,
    /// Language lab, reserved for english-category subjects.
    EnglishClass,
    /// Room in the legacy annex, reserved for the legacy intake.
    LegacyAnnex,
    /// High-tier program room; `newest_cohort` distinguishes rooms
    /// fitted for the newest intake's high-tier sections.
    HighTier {
        /// Fitted out for the newest intake.
        newest_cohort: bool,
    },
}

/// Operational status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    /// Free to be committed to a timetable.
    Available,
    /// Holds at least one committed assignment.
    Occupied,
    /// Withdrawn from service (maintenance, renovation).
    Unavailable,
}

impl Room {
    /// Creates an available general-category room.
    pub fn new(code: impl Into<String>, capacity: i32) -> Self {
        Self {
            code: code.into(),
            capacity,
            building: String::new(),
            category: RoomCategory::General,
            status: RoomStatus::Available,
        }
    }

    /// Sets the building.
    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = building.into();
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: RoomCategory) -> Self {
        self.category = category;
        self
    }

    /// Sets the operational status.
    pub fn with_status(mut self, status: RoomStatus) -> Self {
        self.status = status;
        self
    }
}

impl RoomCategory {
    /// Maps raw configuration text to a category.
    ///
    /// Accepts the label vocabulary of the legacy room dataset; the
    /// high-tier newest-intake marker is a distinct label rather than a
    /// free-text note.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "general" => Some(Self::General),
            "khoa_2024" | "newest_cohort" => Some(Self::NewestCohort),
            "english_class" => Some(Self::EnglishClass),
            "ngoc_truc" | "legacy_annex" => Some(Self::LegacyAnnex),
            "clc" | "high_tier" => Some(Self::HighTier {
                newest_cohort: false,
            }),
            "clc_2024" | "high_tier_newest" => Some(Self::HighTier {
                newest_cohort: true,
            }),
            _ => None,
        }
    }
}

impl RoomStatus {
    /// Stable identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "AVAILABLE",
            RoomStatus::Occupied => "OCCUPIED",
            RoomStatus::Unavailable => "UNAVAILABLE",
        }
    }
}
