//! Scheduling request model.
//!
//! One request per subject in a batch; the scheduler generates
//! `section_count` class sections for it.

use serde::{Deserialize, Serialize};

/// A subject to be scheduled into the weekly timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRequest {
    /// Subject code (e.g. "INT1154").
    pub subject_code: String,
    /// Human-readable subject name.
    pub subject_name: String,
    /// Total periods over the term; selects the template pool and the
    /// allocation path.
    pub total_periods: i32,
    /// Students enrolled across all sections.
    pub total_students: i32,
    /// Planned students per section for standard programs.
    pub students_per_class: i32,
    /// Number of class sections to generate.
    pub section_count: i32,
    /// Major the subject belongs to, keys building preferences.
    pub major: Option<String>,
    /// Subject category ("english", "general", ...).
    pub subject_category: String,
    /// Student cohort year ("2024", "2022", ...).
    pub cohort_year: Option<String>,
    /// Special program label; the high-tier program routes to dedicated
    /// rooms, any other non-empty value gets no room.
    pub special_program: Option<String>,
}

impl SectionRequest {
    /// Creates a one-section general-category request.
    pub fn new(
        subject_code: impl Into<String>,
        subject_name: impl Into<String>,
        total_periods: i32,
    ) -> Self {
        Self {
            subject_code: subject_code.into(),
            subject_name: subject_name.into(),
            total_periods,
            total_students: 0,
            students_per_class: 0,
            section_count: 1,
            major: None,
            subject_category: "general".to_string(),
            cohort_year: None,
            special_program: None,
        }
    }

    /// Sets enrollment numbers.
    pub fn with_students(mut self, total: i32, per_class: i32) -> Self {
        self.total_students = total;
        self.students_per_class = per_class;
        self
    }

    /// Sets the number of sections.
    pub fn with_sections(mut self, count: i32) -> Self {
        self.section_count = count;
        self
    }

    /// Sets the major code.
    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = Some(major.into());
        self
    }

    /// Sets the subject category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.subject_category = category.into();
        self
    }

    /// Sets the cohort year.
    pub fn with_cohort(mut self, year: impl Into<String>) -> Self {
        self.cohort_year = Some(year.into());
        self
    }

    /// Sets the special program label.
    pub fn with_special_program(mut self, program: impl Into<String>) -> Self {
        self.special_program = Some(program.into());
        self
    }

    /// Whether a non-empty special program is set.
    pub fn has_special_program(&self) -> bool {
        self.special_program
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }

    /// Section count clamped to at least one.
    pub fn effective_sections(&self) -> i32 {
        self.section_count.max(1)
    }

    /// Seats required per section.
    ///
    /// Special programs split total enrollment evenly across sections;
    /// standard programs use the planned per-section size.
    pub fn capacity_per_section(&self) -> i32 {
        if self.has_special_program() {
            self.total_students / self.effective_sections()
        } else {
            self.students_per_class
        }
    }
}
