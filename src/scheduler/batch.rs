//! Rotating-slot batch generation.
//!
//! # Algorithm
//!
//! 1. Load the template catalog and the room inventory.
//! 2. Start a fresh session: uncommitted occupancy and the sticky-room
//!    map are dropped, the session cursor rewinds to the committed one.
//! 3. Per request, in caller order: pool the template rows matching the
//!    subject's total periods, then walk the rotating sequence.
//!    Sections are packed two per slot (four for the high-density
//!    total), each drawing matching rows until its period total is
//!    consumed. Subjects at the long-duration total switch to the
//!    paired-day sequence instead, holding one room across two
//!    consecutive days.
//! 4. Advance the session cursor past the last slot the subject used.
//!
//! Nothing is persisted by generation; a batch becomes durable only
//! through [`BatchScheduler::commit_batch`], and an uncommitted batch
//! is discarded by the next generation call.

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::TemplateCatalog;
use crate::config::ScheduleConfig;
use crate::conflicts::ConflictReport;
use crate::error::ScheduleResult;
use crate::ledger::OccupancyLedger;
use crate::models::{
    OccupancyCounts, OccupancyKey, Room, RoomStatus, ScheduleEntry, ScheduleRow, SectionRequest,
    TemplateRow,
};
use crate::rooms::{RoomPick, RoomPicker, RoomQuery};
use crate::rotation::{
    map_single_to_paired, next_start_index, RotatingSlot, DAY_PAIR_SLOTS, ROTATING_SLOTS,
    SEQUENCE_LEN,
};
use crate::stores::{
    BuildingPreferences, CursorStore, OccupancyStore, RoomInventory, StickyRooms, TemplateSource,
};

/// How far a subject's scheduling got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectStatus {
    /// Every section fully scheduled.
    Done,
    /// The iteration guard tripped; periods remain unscheduled.
    Partial,
    /// No template rows exist for the subject's total-period count.
    NoTemplateData,
}

/// One subject's slice of a batch result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectOutcome {
    /// The request this outcome answers.
    pub request: SectionRequest,
    /// Emitted rows, possibly empty.
    pub rows: Vec<ScheduleRow>,
    /// How far scheduling got.
    pub status: SubjectStatus,
    /// Human-readable explanation for Partial and NoTemplateData.
    pub note: Option<String>,
}

/// Result of one generation run. Tentative until committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Per-subject results, in request order; every request gets one.
    pub subjects: Vec<SubjectOutcome>,
    /// Rows emitted across all subjects.
    pub total_rows: usize,
    /// Rotation cursor after the batch, not yet persisted.
    pub session_cursor: i32,
    /// Occupancy keys marked this batch, not yet committed.
    pub session_occupancy: usize,
}

/// What a commit made durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Occupancy keys that entered the global record.
    pub committed_keys: usize,
    /// Global record size after the commit.
    pub global_total: usize,
    /// Rotation cursor persisted with the commit.
    pub cursor: i32,
    /// Rooms transitioned Available → Occupied.
    pub rooms_marked_occupied: usize,
}

/// Shared mutable state: one writer at a time.
struct SchedulerState {
    ledger: OccupancyLedger,
    sticky: StickyRooms,
}

/// Batch timetable generator.
///
/// Owns the template catalog, the room picker, and the occupancy
/// ledger; collaborators arrive as trait objects. Generation and
/// commit are mutually exclusive critical sections over one mutex, so
/// an in-flight batch can never interleave with a commit against the
/// same ledger.
pub struct BatchScheduler {
    catalog: TemplateCatalog,
    inventory: Arc<dyn RoomInventory>,
    preferences: Arc<dyn BuildingPreferences>,
    picker: RoomPicker,
    config: ScheduleConfig,
    state: Mutex<SchedulerState>,
}

impl BatchScheduler {
    /// Wires up a scheduler; loads persisted occupancy and cursor.
    pub fn new(
        config: ScheduleConfig,
        templates: Arc<dyn TemplateSource>,
        inventory: Arc<dyn RoomInventory>,
        occupancy_store: Arc<dyn OccupancyStore>,
        cursor_store: Arc<dyn CursorStore>,
        preferences: Arc<dyn BuildingPreferences>,
    ) -> ScheduleResult<Self> {
        let ledger = OccupancyLedger::load(occupancy_store, cursor_store)?;
        Ok(Self {
            catalog: TemplateCatalog::new(templates),
            inventory,
            preferences,
            picker: RoomPicker::new(config.clone()),
            config,
            state: Mutex::new(SchedulerState {
                ledger,
                sticky: StickyRooms::new(),
            }),
        })
    }

    /// Generates a tentative timetable for a batch of requests.
    ///
    /// Requests are processed strictly in the order given. One
    /// subject's failure never aborts the batch: unschedulable
    /// subjects come back as `NoTemplateData` or `Partial` outcomes
    /// next to their siblings. The only batch-level errors are an
    /// empty catalog and collaborator I/O failures.
    pub fn generate_batch(&self, requests: &[SectionRequest]) -> ScheduleResult<BatchOutcome> {
        let mut state = self.state.lock();
        let state = &mut *state;

        let templates = self.catalog.load_all()?;
        let rooms = self.inventory.list_all()?;
        state.ledger.start_batch();
        state.sticky.clear_all();

        let mut subjects = Vec::with_capacity(requests.len());
        for request in requests {
            let pool: Vec<&TemplateRow> = templates
                .iter()
                .filter(|row| row.total_periods == request.total_periods)
                .collect();

            let outcome = if pool.is_empty() {
                warn!(
                    "no template rows for {} total periods ({})",
                    request.total_periods, request.subject_code
                );
                SubjectOutcome {
                    request: request.clone(),
                    rows: Vec::new(),
                    status: SubjectStatus::NoTemplateData,
                    note: Some(format!(
                        "no template rows exist for {} total periods",
                        request.total_periods
                    )),
                }
            } else {
                let preferred = self.preferred_buildings(request);
                if request.total_periods == self.config.long_duration_periods {
                    self.schedule_paired(request, &pool, &rooms, &preferred, state)
                } else {
                    self.schedule_rotating(request, &pool, &rooms, &preferred, state)
                }
            };
            subjects.push(outcome);
        }

        let outcome = BatchOutcome {
            total_rows: subjects.iter().map(|s| s.rows.len()).sum(),
            session_cursor: state.ledger.session_cursor(),
            session_occupancy: state.ledger.counts().session,
            subjects,
        };
        info!(
            "batch generated: {} subjects, {} rows, cursor {}",
            outcome.subjects.len(),
            outcome.total_rows,
            outcome.session_cursor
        );
        Ok(outcome)
    }

    /// Makes the last generated batch durable.
    ///
    /// Persists the merged occupancy record and the cursor, then asks
    /// the inventory to flip each newly committed room from Available
    /// to Occupied; rooms already non-Available are left untouched.
    pub fn commit_batch(&self) -> ScheduleResult<CommitSummary> {
        let mut state = self.state.lock();
        let committed = state.ledger.commit()?;

        // Keys are sorted, so per-room duplicates are adjacent.
        let mut codes: Vec<&str> = committed
            .newly_committed
            .iter()
            .map(|key| key.room.as_str())
            .collect();
        codes.dedup();

        let inventory = self.inventory.list_all()?;
        let mut transitioned = 0usize;
        for code in codes {
            let known = inventory.iter().find(|room| room.code == code);
            if known.is_some_and(|room| room.status == RoomStatus::Available) {
                self.inventory.set_status(code, RoomStatus::Occupied)?;
                transitioned += 1;
            }
        }

        info!(
            "batch committed: {} keys, {} rooms marked occupied",
            committed.newly_committed.len(),
            transitioned
        );
        Ok(CommitSummary {
            committed_keys: committed.newly_committed.len(),
            global_total: committed.global_total,
            cursor: committed.cursor,
            rooms_marked_occupied: transitioned,
        })
    }

    /// Clears all occupancy state and rewinds the cursor, persistently.
    pub fn reset_all(&self) -> ScheduleResult<()> {
        let mut state = self.state.lock();
        state.sticky.clear_all();
        state.ledger.reset()
    }

    /// Rewinds only the rotation cursor, persistently.
    pub fn reset_cursor(&self) -> ScheduleResult<()> {
        self.state.lock().ledger.reset_cursor()
    }

    /// Current occupancy key counts.
    pub fn occupancy_counts(&self) -> OccupancyCounts {
        self.state.lock().ledger.counts()
    }

    /// Finds double-bookings in an externally produced schedule.
    pub fn detect_conflicts(&self, entries: &[ScheduleEntry]) -> ConflictReport {
        crate::conflicts::detect_conflicts(entries, &self.config)
    }

    /// Drops the template cache; call after the backing dataset changes.
    pub fn invalidate_catalog(&self) {
        self.catalog.invalidate();
    }

    /// Preference list for the request's major, or the config default.
    fn preferred_buildings(&self, request: &SectionRequest) -> Vec<String> {
        let preferred = self.preferences.preferred_for(request.major.as_deref());
        if preferred.is_empty() {
            self.config.default_preferred_buildings.clone()
        } else {
            preferred
        }
    }

    /// Sections sharing one rotating slot: four for the high-density
    /// period total, two otherwise.
    fn section_chunk(&self, total_periods: i32) -> usize {
        if total_periods == self.config.high_density_periods {
            4
        } else {
            2
        }
    }

    /// Standard path: walk the single-day rotating sequence.
    fn schedule_rotating(
        &self,
        request: &SectionRequest,
        pool: &[&TemplateRow],
        rooms: &[Room],
        preferred: &[String],
        state: &mut SchedulerState,
    ) -> SubjectOutcome {
        let sections = request.effective_sections();
        let chunk = self.section_chunk(request.total_periods);
        let start = next_start_index(state.ledger.session_cursor());

        let mut rows: Vec<ScheduleRow> = Vec::new();
        let mut status = SubjectStatus::Done;
        let mut note = None;
        let mut pool_cursor = 0usize;

        'sections: for section in 1..=sections {
            let slot = &ROTATING_SLOTS[(start + (section - 1) as usize / chunk) % SEQUENCE_LEN];
            debug!(
                "{} section {section}: day {} {:?}",
                request.subject_code, slot.day_of_week, slot.session
            );
            let mut remaining = request.total_periods;
            let mut section_pick = RoomPick::default();
            let mut guard = 0u32;

            while remaining > 0 {
                if guard >= self.config.iteration_guard {
                    warn!(
                        "iteration guard tripped for {} section {section}: {remaining} periods left",
                        request.subject_code
                    );
                    status = SubjectStatus::Partial;
                    note = Some(format!(
                        "section {section} left with {remaining} unscheduled periods"
                    ));
                    break 'sections;
                }

                let template = draw_slot_row(pool, &mut pool_cursor, slot);
                guard += 1;
                if template.used_periods() <= 0 {
                    continue;
                }

                let mut row = ScheduleRow::from_template(section, request, template, remaining);
                if template.start_period != self.config.remote_start_period {
                    if !section_pick.is_assigned() {
                        let query = RoomQuery::for_request(
                            request,
                            template.day_of_week,
                            template.session_block,
                        );
                        section_pick = self.picker.pick(
                            rooms,
                            &query,
                            &mut state.ledger,
                            &mut state.sticky,
                            preferred,
                        );
                    }
                    if let Some(code) = &section_pick.room {
                        row = row.with_room(code.as_str(), section_pick.via_fallback);
                    }
                }

                remaining = row.remaining_after;
                rows.push(row);
            }
        }

        if !rows.is_empty() {
            let end_slot = (sections - 1) as usize / chunk % SEQUENCE_LEN;
            state
                .ledger
                .set_session_cursor(((start + end_slot) % SEQUENCE_LEN) as i32);
        }

        SubjectOutcome {
            request: request.clone(),
            rows,
            status,
            note,
        }
    }

    /// Long-duration path: sections take one fixed session-block across
    /// a pair of consecutive days, one room held for both.
    fn schedule_paired(
        &self,
        request: &SectionRequest,
        pool: &[&TemplateRow],
        rooms: &[Room],
        preferred: &[String],
        state: &mut SchedulerState,
    ) -> SubjectOutcome {
        let sections = request.effective_sections();
        let start = map_single_to_paired(state.ledger.session_cursor());

        let mut groups: HashMap<(u8, u8), Vec<&TemplateRow>> = HashMap::new();
        for row in pool {
            groups
                .entry((row.day_of_week, row.session_block))
                .or_default()
                .push(row);
        }

        let mut rows: Vec<ScheduleRow> = Vec::new();
        for section in 1..=sections {
            let slot = &DAY_PAIR_SLOTS[(start + (section - 1) as usize) % SEQUENCE_LEN];
            debug!(
                "{} section {section}: days {}+{} block {}",
                request.subject_code, slot.first_day, slot.second_day, slot.session_block
            );
            let mut section_pick = RoomPick::default();

            for day in slot.days() {
                let Some(day_rows) = groups.get(&(day, slot.session_block)) else {
                    warn!(
                        "no {}-period template rows for day {day} block {} ({})",
                        request.total_periods, slot.session_block, request.subject_code
                    );
                    continue;
                };

                for template in day_rows {
                    // A paired row consumes its full contribution at once.
                    let mut row = ScheduleRow::from_template(
                        section,
                        request,
                        template,
                        template.used_periods(),
                    );
                    if template.start_period != self.config.remote_start_period {
                        if !section_pick.is_assigned() {
                            let query =
                                RoomQuery::for_request(request, day, slot.session_block);
                            section_pick = self.picker.pick(
                                rooms,
                                &query,
                                &mut state.ledger,
                                &mut state.sticky,
                                preferred,
                            );
                        }
                        if let Some(code) = &section_pick.room {
                            row = row.with_room(code.as_str(), section_pick.via_fallback);
                            // The room is held on both days of the pair.
                            for held_day in slot.days() {
                                state.ledger.mark_occupied(OccupancyKey::new(
                                    code.as_str(),
                                    held_day,
                                    slot.session_block,
                                ));
                            }
                        }
                    }
                    rows.push(row);
                }
            }
        }

        if !rows.is_empty() {
            let end_slot = (sections - 1) as usize / self.section_chunk(request.total_periods)
                % SEQUENCE_LEN;
            state
                .ledger
                .set_session_cursor(((start + end_slot) % SEQUENCE_LEN) as i32);
        }

        SubjectOutcome {
            request: request.clone(),
            rows,
            status: SubjectStatus::Done,
            note: None,
        }
    }
}

/// Draws the next pool row matching the slot's day and session half,
/// scanning at most one full lap; when nothing matches, best-effort
/// degrades to the row at the cursor.
fn draw_slot_row<'a>(
    pool: &[&'a TemplateRow],
    pool_cursor: &mut usize,
    slot: &RotatingSlot,
) -> &'a TemplateRow {
    for _ in 0..pool.len() {
        let row = pool[*pool_cursor % pool.len()];
        *pool_cursor += 1;
        if row.day_of_week == slot.day_of_week && slot.session.contains(row.session_block) {
            return row;
        }
    }
    let row = pool[*pool_cursor % pool.len()];
    *pool_cursor += 1;
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, RawRow, RoomCategory, WEEK_COUNT};
    use crate::stores::{
        MemoryCursorStore, MemoryOccupancyStore, MemoryRoomInventory, MemoryTemplateSource,
        StaticBuildingPreferences,
    };

    fn raw_row(
        total: i32,
        day: u8,
        block: u8,
        start: i32,
        length: i32,
        id: &str,
        weeks: usize,
    ) -> RawRow {
        let mut cells: RawRow = vec![
            Cell::from(total),
            Cell::from(i32::from(day)),
            Cell::from(i32::from(block)),
            Cell::from(start),
            Cell::from(length),
            Cell::from(id),
        ];
        for week in 0..WEEK_COUNT {
            cells.push(Cell::from(if week < weeks { "x" } else { "" }));
        }
        cells
    }

    fn make_room(code: &str, capacity: i32) -> Room {
        let building = code.split('-').next().unwrap_or_default();
        Room::new(code, capacity).with_building(building)
    }

    struct TestRig {
        scheduler: BatchScheduler,
        inventory: Arc<MemoryRoomInventory>,
        occupancy: Arc<MemoryOccupancyStore>,
        cursor: Arc<MemoryCursorStore>,
    }

    fn make_rig_with(config: ScheduleConfig, rows: Vec<RawRow>, rooms: Vec<Room>) -> TestRig {
        let _ = env_logger::builder().is_test(true).try_init();
        let inventory = Arc::new(MemoryRoomInventory::new(rooms));
        let occupancy = Arc::new(MemoryOccupancyStore::new());
        let cursor = Arc::new(MemoryCursorStore::new());
        let scheduler = BatchScheduler::new(
            config,
            Arc::new(MemoryTemplateSource::new(rows)),
            inventory.clone(),
            occupancy.clone(),
            cursor.clone(),
            Arc::new(StaticBuildingPreferences::new()),
        )
        .unwrap();
        TestRig {
            scheduler,
            inventory,
            occupancy,
            cursor,
        }
    }

    fn make_rig(rows: Vec<RawRow>, rooms: Vec<Room>) -> TestRig {
        make_rig_with(ScheduleConfig::default(), rows, rooms)
    }

    fn request_30(code: &str) -> SectionRequest {
        SectionRequest::new(code, code, 30).with_students(60, 60)
    }

    #[test]
    fn test_section_accumulates_rows_until_total_reached() {
        // Each draw contributes 3×4 = 12 periods; 30 needs three draws.
        let rows = (0..10)
            .map(|i| raw_row(30, 2, 1, 1, 3, &format!("R{i}"), 4))
            .collect();
        let rig = make_rig(rows, vec![make_room("A2-101", 80)]);

        let outcome = rig.scheduler.generate_batch(&[request_30("S1")]).unwrap();

        let subject = &outcome.subjects[0];
        assert_eq!(subject.status, SubjectStatus::Done);
        assert_eq!(subject.rows.len(), 3);
        let before: Vec<i32> = subject.rows.iter().map(|r| r.remaining_before).collect();
        assert_eq!(before, vec![30, 18, 6]);
        assert_eq!(subject.rows[2].remaining_after, -6);
        assert_eq!(outcome.total_rows, 3);
    }

    #[test]
    fn test_rows_carry_request_and_template_metadata() {
        let rows = vec![raw_row(30, 2, 1, 1, 3, "T42", 10)];
        let rig = make_rig(rows, vec![make_room("A2-101", 80)]);
        let request = request_30("INT1154")
            .with_major("IT")
            .with_cohort("2024");

        let outcome = rig.scheduler.generate_batch(&[request]).unwrap();

        let row = &outcome.subjects[0].rows[0];
        assert_eq!(row.section, 1);
        assert_eq!(row.subject_code, "INT1154");
        assert_eq!(row.template_id, "T42");
        assert_eq!((row.day_of_week, row.session_block), (2, 1));
        assert_eq!(row.room.as_deref(), Some("A2-101"));
        assert!(!row.room_fallback);
        assert_eq!(row.cohort_year.as_deref(), Some("2024"));
        assert_eq!(row.major.as_deref(), Some("IT"));
    }

    #[test]
    fn test_sections_packed_two_per_slot() {
        // Fresh cursor: sections 1-2 land on slot 0 (day 2 morning),
        // section 3 on slot 1 (day 3 afternoon).
        let rows = vec![
            raw_row(30, 2, 1, 1, 3, "R1", 10),
            raw_row(30, 2, 2, 4, 3, "R2", 10),
            raw_row(30, 3, 3, 7, 3, "R3", 10),
        ];
        let rig = make_rig(
            rows,
            vec![make_room("A2-101", 80), make_room("A2-102", 80)],
        );

        let outcome = rig
            .scheduler
            .generate_batch(&[request_30("S1").with_sections(3)])
            .unwrap();

        let days: Vec<u8> = outcome.subjects[0]
            .rows
            .iter()
            .map(|r| r.day_of_week)
            .collect();
        assert_eq!(days, vec![2, 2, 3]);
        // Last section sat on slot index 1.
        assert_eq!(outcome.session_cursor, 1);
    }

    #[test]
    fn test_high_density_total_packs_four_per_slot() {
        let config = ScheduleConfig::default();
        let rows = vec![
            raw_row(14, 2, 1, 1, 2, "R1", 7),
            raw_row(14, 2, 2, 4, 2, "R2", 7),
            raw_row(14, 2, 1, 6, 2, "R3", 7),
            raw_row(14, 2, 2, 9, 2, "R4", 7),
            raw_row(14, 3, 3, 1, 2, "R5", 7),
        ];
        let rig = make_rig_with(
            config,
            rows,
            vec![make_room("A2-101", 80), make_room("A2-102", 80)],
        );
        let request = SectionRequest::new("S1", "S1", 14)
            .with_students(200, 40)
            .with_sections(5);

        let outcome = rig.scheduler.generate_batch(&[request]).unwrap();

        let days: Vec<u8> = outcome.subjects[0]
            .rows
            .iter()
            .map(|r| r.day_of_week)
            .collect();
        // Four sections share day 2; the fifth spills to slot 1.
        assert_eq!(days, vec![2, 2, 2, 2, 3]);
        assert_eq!(outcome.session_cursor, 1);
    }

    #[test]
    fn test_sticky_room_follows_subject_across_blocks() {
        let rows = vec![
            raw_row(30, 2, 1, 1, 3, "R1", 10),
            raw_row(30, 2, 2, 4, 3, "R2", 10),
        ];
        let rig = make_rig(rows, vec![make_room("A2-101", 80)]);

        let outcome = rig
            .scheduler
            .generate_batch(&[request_30("S1").with_sections(2)])
            .unwrap();

        let rows = &outcome.subjects[0].rows;
        assert_eq!(rows[0].room.as_deref(), Some("A2-101"));
        assert_eq!(rows[1].room.as_deref(), Some("A2-101"));
        // Same room, different block: two distinct occupancy keys.
        assert_eq!(outcome.session_occupancy, 2);
    }

    #[test]
    fn test_two_subjects_never_share_room_and_slot() {
        let rows = vec![
            raw_row(30, 2, 1, 1, 3, "R1", 10),
            raw_row(30, 3, 3, 7, 3, "R2", 10),
        ];
        let rig = make_rig(rows, vec![make_room("A2-101", 80)]);

        let outcome = rig
            .scheduler
            .generate_batch(&[request_30("S1"), request_30("S2")])
            .unwrap();

        let first = &outcome.subjects[0].rows[0];
        let second = &outcome.subjects[1].rows[0];
        let triple = |r: &ScheduleRow| (r.room.clone(), r.day_of_week, r.session_block);
        assert_ne!(triple(first), triple(second));
        assert_eq!(outcome.session_occupancy, 2);
    }

    #[test]
    fn test_occupancy_keys_distinct_across_sections() {
        let rows = vec![
            raw_row(30, 2, 1, 1, 3, "R1", 10),
            raw_row(30, 2, 2, 4, 3, "R2", 10),
            raw_row(30, 3, 3, 7, 3, "R3", 10),
            raw_row(30, 3, 4, 10, 3, "R4", 10),
        ];
        let rig = make_rig(rows, vec![make_room("A2-101", 80)]);

        let outcome = rig
            .scheduler
            .generate_batch(&[
                request_30("S1").with_sections(2),
                request_30("S2").with_sections(2),
            ])
            .unwrap();

        let mut seen = std::collections::HashSet::new();
        for subject in &outcome.subjects {
            for row in &subject.rows {
                let room = row.room.clone().expect("every section gets the room");
                assert!(
                    seen.insert((room, row.day_of_week, row.session_block)),
                    "two sections share a room/slot key"
                );
            }
        }
        assert_eq!(outcome.session_occupancy, 4);
    }

    #[test]
    fn test_remote_rows_take_no_room() {
        let rig = make_rig(
            vec![raw_row(30, 2, 1, 12, 3, "R1", 10)],
            vec![make_room("A2-101", 80)],
        );

        let outcome = rig.scheduler.generate_batch(&[request_30("S1")]).unwrap();

        let subject = &outcome.subjects[0];
        assert_eq!(subject.status, SubjectStatus::Done);
        assert!(subject.rows[0].room.is_none());
        assert_eq!(outcome.session_occupancy, 0);
    }

    #[test]
    fn test_missing_template_data_is_reported_not_fatal() {
        let rig = make_rig(
            vec![raw_row(30, 2, 1, 1, 3, "R1", 10)],
            vec![make_room("A2-101", 80)],
        );
        let absent = SectionRequest::new("S1", "S1", 45).with_students(60, 60);

        let outcome = rig
            .scheduler
            .generate_batch(&[absent, request_30("S2")])
            .unwrap();

        let skipped = &outcome.subjects[0];
        assert_eq!(skipped.status, SubjectStatus::NoTemplateData);
        assert!(skipped.rows.is_empty());
        assert!(skipped.note.as_deref().unwrap().contains("45"));
        // The sibling subject still scheduled, from the untouched cursor.
        assert_eq!(outcome.subjects[1].status, SubjectStatus::Done);
        assert_eq!(outcome.subjects[1].rows[0].day_of_week, 2);
    }

    #[test]
    fn test_empty_catalog_fails_the_batch() {
        let rig = make_rig(Vec::new(), vec![make_room("A2-101", 80)]);
        let err = rig
            .scheduler
            .generate_batch(&[request_30("S1")])
            .unwrap_err();
        assert!(matches!(err, crate::error::ScheduleError::EmptyCatalog));
    }

    #[test]
    fn test_iteration_guard_leaves_subject_partial() {
        // Every pool row has zero active weeks, so nothing ever
        // consumes periods and the guard must trip.
        let config = ScheduleConfig::default().with_iteration_guard(25);
        let rig = make_rig_with(
            config,
            vec![raw_row(30, 2, 1, 1, 3, "R1", 0)],
            vec![make_room("A2-101", 80)],
        );

        let outcome = rig
            .scheduler
            .generate_batch(&[request_30("S1"), request_30("S2")])
            .unwrap();

        let tripped = &outcome.subjects[0];
        assert_eq!(tripped.status, SubjectStatus::Partial);
        assert!(tripped.rows.is_empty());
        assert!(tripped.note.as_deref().unwrap().contains("30"));
        // No rows emitted, so the cursor never moved for it.
        assert_eq!(outcome.subjects[1].status, SubjectStatus::Partial);
        assert_eq!(outcome.session_cursor, -1);
    }

    #[test]
    fn test_generation_is_idempotent_until_commit() {
        let rows = vec![
            raw_row(30, 2, 1, 1, 3, "R1", 10),
            raw_row(30, 3, 3, 7, 3, "R2", 10),
        ];
        let rig = make_rig(rows, vec![make_room("A2-101", 80)]);
        let requests = [request_30("S1"), request_30("S2")];

        let first = rig.scheduler.generate_batch(&requests).unwrap();
        let second = rig.scheduler.generate_batch(&requests).unwrap();

        assert_eq!(first, second);
        assert_eq!(rig.scheduler.occupancy_counts().global, 0);
    }

    #[test]
    fn test_commit_round_trip() {
        let rig = make_rig(
            vec![raw_row(30, 2, 1, 1, 3, "R1", 10)],
            vec![make_room("A2-101", 80)],
        );

        let outcome = rig.scheduler.generate_batch(&[request_30("S1")]).unwrap();
        assert_eq!(outcome.session_occupancy, 1);

        let summary = rig.scheduler.commit_batch().unwrap();
        assert_eq!(summary.committed_keys, 1);
        assert_eq!(summary.global_total, 1);
        assert_eq!(summary.cursor, 0);

        let counts = rig.scheduler.occupancy_counts();
        assert_eq!(counts.session, 0);
        assert_eq!(counts.global, 1);
        // Durable in the backing stores.
        assert_eq!(rig.occupancy.load().unwrap().len(), 1);
        assert_eq!(rig.cursor.load().unwrap(), 0);
    }

    #[test]
    fn test_commit_flips_room_status() {
        let rig = make_rig(
            vec![raw_row(30, 2, 1, 1, 3, "R1", 10)],
            vec![make_room("A2-101", 80), make_room("A2-102", 80)],
        );

        rig.scheduler.generate_batch(&[request_30("S1")]).unwrap();
        let summary = rig.scheduler.commit_batch().unwrap();
        assert_eq!(summary.rooms_marked_occupied, 1);

        let rooms = rig.inventory.list_all().unwrap();
        let status_of = |code: &str| {
            rooms
                .iter()
                .find(|r| r.code == code)
                .map(|r| r.status)
                .unwrap()
        };
        assert_eq!(status_of("A2-101"), RoomStatus::Occupied);
        assert_eq!(status_of("A2-102"), RoomStatus::Available);
    }

    #[test]
    fn test_next_batch_sees_committed_occupancy() {
        let rig = make_rig(
            vec![raw_row(30, 2, 1, 1, 3, "R1", 10)],
            vec![make_room("A2-101", 80), make_room("A2-102", 80)],
        );

        rig.scheduler.generate_batch(&[request_30("S1")]).unwrap();
        rig.scheduler.commit_batch().unwrap();

        // Cursor 0 moves the next subject to slot 1 (day 3), but this
        // catalog only has day-2 rows: the draw falls back to them and
        // the room engine must avoid the committed key.
        let outcome = rig.scheduler.generate_batch(&[request_30("S2")]).unwrap();
        let row = &outcome.subjects[0].rows[0];
        assert_eq!((row.day_of_week, row.session_block), (2, 1));
        assert_eq!(row.room.as_deref(), Some("A2-102"));
    }

    #[test]
    fn test_reset_all_clears_counts_and_cursor() {
        let rig = make_rig(
            vec![raw_row(30, 2, 1, 1, 3, "R1", 10)],
            vec![make_room("A2-101", 80)],
        );
        rig.scheduler.generate_batch(&[request_30("S1")]).unwrap();
        rig.scheduler.commit_batch().unwrap();

        rig.scheduler.reset_all().unwrap();

        assert_eq!(rig.scheduler.occupancy_counts(), OccupancyCounts::default());
        assert!(rig.occupancy.load().unwrap().is_empty());
        assert_eq!(rig.cursor.load().unwrap(), -1);
    }

    #[test]
    fn test_reset_cursor_keeps_occupancy() {
        let rig = make_rig(
            vec![raw_row(30, 2, 1, 1, 3, "R1", 10)],
            vec![make_room("A2-101", 80)],
        );
        rig.scheduler.generate_batch(&[request_30("S1")]).unwrap();
        rig.scheduler.commit_batch().unwrap();

        rig.scheduler.reset_cursor().unwrap();

        assert_eq!(rig.cursor.load().unwrap(), -1);
        assert_eq!(rig.scheduler.occupancy_counts().global, 1);
    }

    #[test]
    fn test_cursor_stays_in_bounds_across_batches() {
        let rows = vec![
            raw_row(30, 2, 1, 1, 3, "R1", 10),
            raw_row(30, 3, 3, 7, 3, "R2", 10),
            raw_row(30, 4, 1, 1, 3, "R3", 10),
            raw_row(30, 5, 3, 7, 3, "R4", 10),
        ];
        let mut rooms = Vec::new();
        for i in 0..40 {
            rooms.push(make_room(&format!("A2-{i}"), 80));
        }
        let rig = make_rig(rows, rooms);

        for batch in 0..8 {
            let requests = [
                request_30(&format!("A{batch}")).with_sections(3),
                request_30(&format!("B{batch}")).with_sections(5),
            ];
            let outcome = rig.scheduler.generate_batch(&requests).unwrap();
            assert!((0..12).contains(&outcome.session_cursor));
            let summary = rig.scheduler.commit_batch().unwrap();
            assert!((-1..12).contains(&summary.cursor));
        }
    }

    #[test]
    fn test_paired_day_subject_holds_room_across_both_days() {
        let rows = vec![
            raw_row(60, 2, 1, 1, 3, "P1", 15),
            raw_row(60, 3, 1, 1, 3, "P2", 15),
        ];
        let rig = make_rig(rows, vec![make_room("A2-101", 80)]);
        let request = SectionRequest::new("S60", "S60", 60).with_students(60, 60);

        let outcome = rig.scheduler.generate_batch(&[request]).unwrap();

        let subject = &outcome.subjects[0];
        assert_eq!(subject.status, SubjectStatus::Done);
        assert_eq!(subject.rows.len(), 2);
        let days: Vec<u8> = subject.rows.iter().map(|r| r.day_of_week).collect();
        assert_eq!(days, vec![2, 3]);
        assert_eq!(subject.rows[0].room, subject.rows[1].room);
        // 45 periods per day-row, fully consumed by its own row.
        assert_eq!(subject.rows[0].remaining_before, 45);
        assert_eq!(subject.rows[0].remaining_after, 0);
        // One room held on two days: exactly two occupancy keys.
        assert_eq!(outcome.session_occupancy, 2);
        assert_eq!(outcome.session_cursor, 0);
    }

    #[test]
    fn test_paired_path_starts_on_fresh_day_pair() {
        let rows = vec![
            raw_row(30, 2, 1, 1, 3, "R1", 10),
            raw_row(60, 6, 1, 1, 3, "P1", 15),
            raw_row(60, 7, 1, 1, 3, "P2", 15),
        ];
        let rig = make_rig(
            rows,
            vec![make_room("A2-101", 80), make_room("A2-102", 80)],
        );
        let long = SectionRequest::new("S60", "S60", 60).with_students(60, 60);

        let outcome = rig
            .scheduler
            .generate_batch(&[request_30("S1"), long])
            .unwrap();

        // The regular subject parks the cursor at slot 0; the mapping
        // jumps the 60-period subject to pair group 1 (days 6-7).
        let days: Vec<u8> = outcome.subjects[1]
            .rows
            .iter()
            .map(|r| r.day_of_week)
            .collect();
        assert_eq!(days, vec![6, 7]);
        assert_eq!(outcome.session_cursor, 4);
    }

    #[test]
    fn test_provider_preference_beats_config_default() {
        let inventory = Arc::new(MemoryRoomInventory::new(vec![
            make_room("A2-101", 80),
            make_room("A3-301", 80),
        ]));
        let scheduler = BatchScheduler::new(
            ScheduleConfig::default(),
            Arc::new(MemoryTemplateSource::new(vec![raw_row(
                30, 2, 1, 1, 3, "R1", 10,
            )])),
            inventory,
            Arc::new(MemoryOccupancyStore::new()),
            Arc::new(MemoryCursorStore::new()),
            Arc::new(StaticBuildingPreferences::new().with_major("IT", ["A3"])),
        )
        .unwrap();

        let outcome = scheduler
            .generate_batch(&[request_30("S1").with_major("IT")])
            .unwrap();
        assert_eq!(outcome.subjects[0].rows[0].room.as_deref(), Some("A3-301"));
    }

    #[test]
    fn test_special_program_rooms() {
        let rooms = vec![
            make_room("A2-101", 80),
            make_room("A1-501", 40).with_category(RoomCategory::HighTier {
                newest_cohort: true,
            }),
        ];
        let rig = make_rig(vec![raw_row(30, 2, 1, 1, 3, "R1", 10)], rooms);
        let request = SectionRequest::new("CLC1", "CLC1", 30)
            .with_students(35, 0)
            .with_special_program("CLC")
            .with_cohort("2024");

        let outcome = rig.scheduler.generate_batch(&[request]).unwrap();
        assert_eq!(outcome.subjects[0].rows[0].room.as_deref(), Some("A1-501"));
    }

    #[test]
    fn test_requests_processed_in_caller_order() {
        let rig = make_rig(
            vec![raw_row(30, 2, 1, 1, 3, "R1", 10)],
            vec![make_room("A2-101", 80), make_room("A2-102", 80)],
        );
        let requests = [request_30("B"), request_30("A"), request_30("C")];

        let outcome = rig.scheduler.generate_batch(&requests).unwrap();

        let order: Vec<&str> = outcome
            .subjects
            .iter()
            .map(|s| s.request.subject_code.as_str())
            .collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }
}
