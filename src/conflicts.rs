//! Post-hoc double-booking detection.
//!
//! Validates an already-materialized schedule (typically imported from
//! an external file) that the generation path never saw. Generation
//! prevents room double-booking by construction, but it never checks
//! teachers, so this pass is the only test for teacher clashes.
//!
//! # Algorithm
//!
//! 1. Fan every entry out to its time-slot occurrences and group them
//!    twice: by (room, slot) and by (teacher, slot). Roomless and
//!    remote entries are excluded from the room grouping only.
//! 2. Within a group, exact repeats (same subject, room, and teacher)
//!    collapse to one; deliberate duplicate listings are not clashes.
//! 3. Any group with more than one distinct combination left is a
//!    conflict, reported with the colliding entries.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::ScheduleConfig;
use crate::models::{ScheduleEntry, SlotKey};

/// Two classes in one room at the same time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConflict {
    /// Room both classes claim.
    pub room: String,
    /// The contested time slot.
    pub slot: SlotKey,
    /// Colliding entries, in first-seen order.
    pub entries: Vec<ScheduleEntry>,
}

/// One teacher in two places at the same time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherConflict {
    /// Teacher identifier.
    pub teacher_id: String,
    /// Teacher display name.
    pub teacher_name: String,
    /// The contested time slot.
    pub slot: SlotKey,
    /// Colliding entries, in first-seen order.
    pub entries: Vec<ScheduleEntry>,
}

/// Everything the detector found. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Room double-bookings, sorted by room then slot.
    pub room_conflicts: Vec<RoomConflict>,
    /// Teacher double-bookings, sorted by teacher then slot.
    pub teacher_conflicts: Vec<TeacherConflict>,
}

impl ConflictReport {
    /// Total number of conflicts of both kinds.
    pub fn total(&self) -> usize {
        self.room_conflicts.len() + self.teacher_conflicts.len()
    }

    /// Whether the schedule is conflict-free.
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Finds room and teacher double-bookings in a materialized schedule.
pub fn detect_conflicts(entries: &[ScheduleEntry], config: &ScheduleConfig) -> ConflictReport {
    let mut by_room: HashMap<(String, SlotKey), Vec<&ScheduleEntry>> = HashMap::new();
    let mut by_teacher: HashMap<(String, SlotKey), Vec<&ScheduleEntry>> = HashMap::new();

    for entry in entries {
        if let Some(room) = physical_room(entry, config) {
            for occurrence in &entry.occurrences {
                by_room
                    .entry((room.to_string(), occurrence.key()))
                    .or_default()
                    .push(entry);
            }
        }
        if !entry.teacher_id.trim().is_empty() {
            for occurrence in &entry.occurrences {
                by_teacher
                    .entry((entry.teacher_id.clone(), occurrence.key()))
                    .or_default()
                    .push(entry);
            }
        }
    }

    let mut room_conflicts = Vec::new();
    for ((room, slot), group) in by_room {
        let distinct = collapse_repeats(&group);
        if distinct.len() > 1 {
            room_conflicts.push(RoomConflict {
                room,
                slot,
                entries: distinct.into_iter().cloned().collect(),
            });
        }
    }
    room_conflicts.sort_by(|a, b| (&a.room, &a.slot).cmp(&(&b.room, &b.slot)));

    let mut teacher_conflicts = Vec::new();
    for ((teacher_id, slot), group) in by_teacher {
        let distinct = collapse_repeats(&group);
        if distinct.len() > 1 {
            teacher_conflicts.push(TeacherConflict {
                teacher_name: distinct[0].teacher_name.clone(),
                teacher_id,
                slot,
                entries: distinct.into_iter().cloned().collect(),
            });
        }
    }
    teacher_conflicts.sort_by(|a, b| (&a.teacher_id, &a.slot).cmp(&(&b.teacher_id, &b.slot)));

    info!(
        "conflict scan: {} entries, {} room conflicts, {} teacher conflicts",
        entries.len(),
        room_conflicts.len(),
        teacher_conflicts.len()
    );
    ConflictReport {
        room_conflicts,
        teacher_conflicts,
    }
}

/// The entry's room, unless it has none or the room text marks a remote
/// meeting ("online", "zoom", ...).
fn physical_room<'a>(entry: &'a ScheduleEntry, config: &ScheduleConfig) -> Option<&'a str> {
    let room = entry.room.as_deref()?.trim();
    if room.is_empty() {
        return None;
    }
    let lower = room.to_lowercase();
    if config
        .remote_room_markers
        .iter()
        .any(|marker| lower.contains(marker.as_str()))
    {
        return None;
    }
    Some(room)
}

/// Collapses exact repeats (same subject, room, and teacher), keeping
/// first-seen order and the last-seen payload.
fn collapse_repeats<'a>(group: &[&'a ScheduleEntry]) -> Vec<&'a ScheduleEntry> {
    let mut seen: HashMap<(&str, Option<&str>, &str), usize> = HashMap::new();
    let mut distinct: Vec<&'a ScheduleEntry> = Vec::new();
    for &entry in group {
        let key = (
            entry.subject_code.as_str(),
            entry.room.as_deref(),
            entry.teacher_id.as_str(),
        );
        match seen.get(&key) {
            Some(&at) => distinct[at] = entry,
            None => {
                seen.insert(key, distinct.len());
                distinct.push(entry);
            }
        }
    }
    distinct
}
