//! Materialized schedule entries for conflict detection.
//!
//! These describe an already-produced schedule, typically imported from
//! an external file, carrying teacher identities that generation never
//! sees.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One scheduled class in a materialized timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Subject code.
    pub subject_code: String,
    /// Subject name.
    pub subject_name: String,
    /// Teacher identifier.
    pub teacher_id: String,
    /// Teacher display name.
    pub teacher_name: String,
    /// Room text; `None` for roomless entries.
    pub room: Option<String>,
    /// Class group label.
    pub class_group: String,
    /// Enrolled students.
    pub student_count: i32,
    /// When the class meets.
    pub occurrences: Vec<SlotOccurrence>,
}

/// One time-slot occurrence of a scheduled class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotOccurrence {
    /// Week label as carried by the source schedule (e.g. "1", "1-9").
    pub week_label: String,
    /// Day of week, 2–7.
    pub day_of_week: u8,
    /// Session block, 1–4.
    pub session_block: u8,
    /// First period.
    pub start_period: i32,
    /// Periods per meeting.
    pub period_length: i32,
}

/// Hashable identity of a time slot; two occurrences collide exactly
/// when all five coordinates match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    /// Week label.
    pub week_label: String,
    /// Day of week.
    pub day_of_week: u8,
    /// Session block.
    pub session_block: u8,
    /// First period.
    pub start_period: i32,
    /// Periods per meeting.
    pub period_length: i32,
}

impl ScheduleEntry {
    /// Creates an entry with no teacher, room, or occurrences.
    pub fn new(subject_code: impl Into<String>) -> Self {
        Self {
            subject_code: subject_code.into(),
            subject_name: String::new(),
            teacher_id: String::new(),
            teacher_name: String::new(),
            room: None,
            class_group: String::new(),
            student_count: 0,
            occurrences: Vec::new(),
        }
    }

    /// Sets the subject name.
    pub fn with_subject_name(mut self, name: impl Into<String>) -> Self {
        self.subject_name = name.into();
        self
    }

    /// Sets teacher identity.
    pub fn with_teacher(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.teacher_id = id.into();
        self.teacher_name = name.into();
        self
    }

    /// Sets the room text.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Sets the class group.
    pub fn with_class_group(mut self, group: impl Into<String>) -> Self {
        self.class_group = group.into();
        self
    }

    /// Sets the student count.
    pub fn with_students(mut self, count: i32) -> Self {
        self.student_count = count;
        self
    }

    /// Adds a time-slot occurrence.
    pub fn with_occurrence(mut self, occurrence: SlotOccurrence) -> Self {
        self.occurrences.push(occurrence);
        self
    }
}

impl SlotOccurrence {
    /// Creates an occurrence.
    pub fn new(
        week_label: impl Into<String>,
        day_of_week: u8,
        session_block: u8,
        start_period: i32,
        period_length: i32,
    ) -> Self {
        Self {
            week_label: week_label.into(),
            day_of_week,
            session_block,
            start_period,
            period_length,
        }
    }

    /// The occurrence's slot identity.
    pub fn key(&self) -> SlotKey {
        SlotKey {
            week_label: self.week_label.clone(),
            day_of_week: self.day_of_week,
            session_block: self.session_block,
            start_period: self.start_period,
            period_length: self.period_length,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.week_label,
            self.day_of_week,
            self.session_block,
            self.start_period,
            self.period_length
        )
    }
}
