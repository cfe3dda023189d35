//! Emitted schedule row model.

use serde::{Deserialize, Serialize};

use super::{SectionRequest, TemplateRow, WEEK_COUNT};

/// One emitted timetable row: a (section, template row) pairing.
///
/// Immutable once emitted. Remaining-period accounting is carried per
/// row so callers can audit how the section's total was consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Section number within the subject, 1-based.
    pub section: i32,
    /// Subject code.
    pub subject_code: String,
    /// Subject name.
    pub subject_name: String,
    /// Session block of the meeting, 1–4.
    pub session_block: u8,
    /// Day of week, 2–7.
    pub day_of_week: u8,
    /// First period of the meeting.
    pub start_period: i32,
    /// Periods per weekly meeting.
    pub period_length: i32,
    /// Assigned room code; `None` when no suitable room existed or the
    /// row is a remote meeting.
    pub room: Option<String>,
    /// Whether the room came from the relaxed category-free fallback
    /// pass and should be manually reviewed.
    pub room_fallback: bool,
    /// Periods still owed to the section before this row.
    pub remaining_before: i32,
    /// Periods still owed after this row.
    pub remaining_after: i32,
    /// Week activity mask copied from the template row.
    pub week_occupancy: [bool; WEEK_COUNT],
    /// Identifier of the originating template row.
    pub template_id: String,
    /// Cohort year from the request.
    pub cohort_year: Option<String>,
    /// Special program from the request.
    pub special_program: Option<String>,
    /// Major from the request.
    pub major: Option<String>,
}

impl ScheduleRow {
    /// Builds a roomless row for a section from a template draw.
    ///
    /// `remaining_before` is the section's period debt entering this
    /// row; the row consumes the template's `used_periods()`.
    pub fn from_template(
        section: i32,
        request: &SectionRequest,
        template: &TemplateRow,
        remaining_before: i32,
    ) -> Self {
        Self {
            section,
            subject_code: request.subject_code.clone(),
            subject_name: request.subject_name.clone(),
            session_block: template.session_block,
            day_of_week: template.day_of_week,
            start_period: template.start_period,
            period_length: template.period_length,
            room: None,
            room_fallback: false,
            remaining_before,
            remaining_after: remaining_before - template.used_periods(),
            week_occupancy: template.week_occupancy,
            template_id: template.id.clone(),
            cohort_year: request.cohort_year.clone(),
            special_program: request.special_program.clone(),
            major: request.major.clone(),
        }
    }

    /// Attaches the assigned room.
    pub fn with_room(mut self, code: impl Into<String>, via_fallback: bool) -> Self {
        self.room = Some(code.into());
        self.room_fallback = via_fallback;
        self
    }

    /// Whether a physical room is attached.
    pub fn has_room(&self) -> bool {
        self.room.is_some()
    }

    /// Periods this row consumes over the term.
    pub fn used_periods(&self) -> i32 {
        self.remaining_before - self.remaining_after
    }
}
