//! Room assignment engine.
//!
//! Picks one room for a class section's weekly slot, or degrades to no
//! room at all: a missing room is data on the emitted row, never an
//! error, because partially-roomed schedules are completed by hand.
//!
//! # Algorithm
//!
//! 1. A slot that needs no physical room (remote periods carry no
//!    day/session) yields an empty pick.
//! 2. The subject's sticky room is returned immediately when it is
//!    still free, large enough, and category-compatible, keeping all
//!    sections of one subject together across the week.
//! 3. Otherwise candidates are filtered by occupancy, capacity, and the
//!    category rules; when that leaves nothing, a relaxed pass drops
//!    the category rules and flags the pick as a fallback.
//! 4. Survivors are ranked by building preference and campus distance,
//!    with seat-count slack as the tie-break; lowest score wins.
//!
//! The winner is recorded as the subject's sticky room and its
//! occupancy key is marked in the ledger before the pick is returned.

use log::debug;

use crate::config::ScheduleConfig;
use crate::ledger::OccupancyLedger;
use crate::models::{OccupancyKey, Room, RoomCategory, RoomStatus, SectionRequest};
use crate::stores::StickyRooms;

/// Everything the engine needs to know about one slot request.
#[derive(Debug, Clone)]
pub struct RoomQuery<'a> {
    /// Subject the section belongs to; keys the sticky-room map.
    pub subject_code: &'a str,
    /// Day of the slot; `None` when no physical room is needed.
    pub day_of_week: Option<u8>,
    /// Session block of the slot; `None` when no physical room is needed.
    pub session_block: Option<u8>,
    /// Seats the section requires.
    pub required_capacity: i32,
    /// Subject category ("english" routes to language labs).
    pub subject_category: &'a str,
    /// Student cohort year, if known.
    pub cohort_year: Option<&'a str>,
    /// Special program label, if any.
    pub special_program: Option<&'a str>,
}

impl<'a> RoomQuery<'a> {
    /// Builds the query for one slot of a request's section.
    pub fn for_request(request: &'a SectionRequest, day_of_week: u8, session_block: u8) -> Self {
        Self {
            subject_code: &request.subject_code,
            day_of_week: Some(day_of_week),
            session_block: Some(session_block),
            required_capacity: request.capacity_per_section(),
            subject_category: &request.subject_category,
            cohort_year: request.cohort_year.as_deref(),
            special_program: request.special_program.as_deref(),
        }
    }

    /// Special program label, trimmed; `None` when blank.
    fn special_program_label(&self) -> Option<&str> {
        self.special_program
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Outcome of one pick. `Default` is the empty, roomless pick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoomPick {
    /// Chosen room code, `None` when nothing suitable was free.
    pub room: Option<String>,
    /// Building of the chosen room.
    pub building: Option<String>,
    /// Whether the building is in the preference list.
    pub preferred_building: bool,
    /// Campus distance from the nearest preferred building.
    pub distance: i32,
    /// True when the room came from the category-free relaxed pass.
    pub via_fallback: bool,
}

impl RoomPick {
    /// Whether a room was actually assigned.
    pub fn is_assigned(&self) -> bool {
        self.room.is_some()
    }
}

/// Stateless picker; per-batch state lives in the ledger and the
/// sticky-room map passed into [`RoomPicker::pick`].
pub struct RoomPicker {
    config: ScheduleConfig,
}

impl RoomPicker {
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    /// Picks a room for one slot.
    ///
    /// Marks the winner's occupancy key in the ledger and records it as
    /// the subject's sticky room. Never fails: an empty pick means the
    /// row goes out roomless.
    pub fn pick(
        &self,
        rooms: &[Room],
        query: &RoomQuery<'_>,
        ledger: &mut OccupancyLedger,
        sticky: &mut StickyRooms,
        preferred: &[String],
    ) -> RoomPick {
        let (Some(day), Some(block)) = (query.day_of_week, query.session_block) else {
            return RoomPick::default();
        };

        // Special programs other than the high-tier one have no room
        // pool at all; the relaxed pass below must not resurrect them.
        if let Some(program) = query.special_program_label() {
            if !program.eq_ignore_ascii_case(&self.config.high_tier_program) {
                debug!(
                    "no room pool for special program {program:?} ({})",
                    query.subject_code
                );
                return RoomPick::default();
            }
        }

        let sticky_code = sticky.get(query.subject_code).map(str::to_string);
        if let Some(code) = &sticky_code {
            if let Some(room) = rooms.iter().find(|r| &r.code == code) {
                let key = OccupancyKey::new(&room.code, day, block);
                if room.status != RoomStatus::Unavailable
                    && room.capacity >= query.required_capacity
                    && !ledger.is_occupied(&key)
                    && self.category_allows(room, query)
                {
                    ledger.mark_occupied(key);
                    debug!("sticky room {} kept for {}", room.code, query.subject_code);
                    return RoomPick {
                        room: Some(room.code.clone()),
                        building: Some(room.building.clone()),
                        preferred_building: true,
                        distance: 0,
                        via_fallback: false,
                    };
                }
            }
        }

        let usable = |room: &&Room| {
            !room.code.trim().is_empty()
                && room.status != RoomStatus::Unavailable
                && room.capacity >= query.required_capacity
                && !ledger.is_occupied(&OccupancyKey::new(&room.code, day, block))
        };

        let mut candidates: Vec<&Room> = rooms
            .iter()
            .filter(usable)
            .filter(|room| self.category_allows(room, query))
            .collect();
        let mut via_fallback = false;
        if candidates.is_empty() {
            candidates = rooms.iter().filter(usable).collect();
            via_fallback = !candidates.is_empty();
            if via_fallback {
                debug!(
                    "category rules relaxed for {} on day {day} block {block}",
                    query.subject_code
                );
            }
        }

        let Some(winner) = candidates.into_iter().min_by_key(|room| {
            self.score(room, query.required_capacity, preferred, sticky_code.as_deref())
        }) else {
            debug!(
                "no room free for {} on day {day} block {block}",
                query.subject_code
            );
            return RoomPick::default();
        };

        ledger.mark_occupied(OccupancyKey::new(&winner.code, day, block));
        sticky.set(query.subject_code, winner.code.as_str());

        let preferred_building = preferred.contains(&winner.building);
        RoomPick {
            room: Some(winner.code.clone()),
            building: Some(winner.building.clone()),
            preferred_building,
            distance: if preferred_building {
                0
            } else {
                self.distance_to_nearest(&winner.building, preferred)
            },
            via_fallback,
        }
    }

    /// Room score, lowest wins.
    ///
    /// Sticky rooms (reachable here only through the relaxed pass) win
    /// outright; then the preference list by index; then everything
    /// else by campus distance. Seat slack breaks ties toward the
    /// tightest fit.
    fn score(
        &self,
        room: &Room,
        required_capacity: i32,
        preferred: &[String],
        sticky_code: Option<&str>,
    ) -> i64 {
        let base: i64 = if sticky_code == Some(room.code.as_str()) {
            -10_000
        } else if let Some(index) = preferred.iter().position(|b| b == &room.building) {
            index as i64 * 100
        } else {
            1_000 + 50 * i64::from(self.distance_to_nearest(&room.building, preferred))
        };
        base + i64::from((room.capacity - required_capacity).abs())
    }

    /// Campus distance from `building` to the closest preferred one,
    /// by ordinal position difference. Zero when no preference exists.
    fn distance_to_nearest(&self, building: &str, preferred: &[String]) -> i32 {
        let position = self.config.building_position(building);
        preferred
            .iter()
            .map(|b| (self.config.building_position(b) - position).abs())
            .min()
            .unwrap_or(0)
    }

    /// Category-compatibility rules, in priority order: high-tier
    /// program rooms split by cohort fit-out; legacy cohorts stay in
    /// the annex; english subjects take language labs; everyone else
    /// takes general rooms, with cohort-reserved rooms open to the
    /// newest intake.
    fn category_allows(&self, room: &Room, query: &RoomQuery<'_>) -> bool {
        let newest_cohort = query
            .cohort_year
            .is_some_and(|y| y == self.config.newest_cohort);

        match query.special_program_label() {
            Some(program) if program.eq_ignore_ascii_case(&self.config.high_tier_program) => {
                room.category == RoomCategory::HighTier { newest_cohort }
            }
            Some(_) => false,
            None => {
                if query
                    .cohort_year
                    .is_some_and(|y| y == self.config.legacy_cohort)
                {
                    room.category == RoomCategory::LegacyAnnex
                } else if query
                    .subject_category
                    .eq_ignore_ascii_case(&self.config.english_category)
                {
                    room.category == RoomCategory::EnglishClass
                } else {
                    room.category == RoomCategory::General
                        || (newest_cohort && room.category == RoomCategory::NewestCohort)
                }
            }
        }
    }
}
