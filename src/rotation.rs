//! Rotating slot sequences.
//!
//! Two fixed 12-entry cycles spread a subject's sections across the
//! teaching week. The single-day sequence walks day × half-day pairs so
//! consecutive subjects land on different days; the paired-day sequence
//! assigns one session-block across two consecutive days for
//! long-duration subjects. A persisted cursor carries the walk position
//! from one batch to the next.

use serde::{Deserialize, Serialize};

/// Length of both rotating sequences.
pub const SEQUENCE_LEN: usize = 12;

/// Morning or afternoon half of a teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionHalf {
    /// Session blocks 1 and 2.
    Morning,
    /// Session blocks 3 and 4.
    Afternoon,
}

impl SessionHalf {
    /// The two session blocks of this half.
    pub fn blocks(self) -> [u8; 2] {
        match self {
            SessionHalf::Morning => [1, 2],
            SessionHalf::Afternoon => [3, 4],
        }
    }

    /// Whether a session block falls in this half.
    pub fn contains(self, session_block: u8) -> bool {
        let [a, b] = self.blocks();
        session_block == a || session_block == b
    }
}

/// One entry of the single-day sequence: a day and a half-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotatingSlot {
    /// Day of week, 2–7.
    pub day_of_week: u8,
    /// Which half of the day.
    pub session: SessionHalf,
}

/// One entry of the paired-day sequence: two consecutive days sharing
/// one session-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPairSlot {
    /// First day of the pair.
    pub first_day: u8,
    /// Second day of the pair.
    pub second_day: u8,
    /// Session block used on both days.
    pub session_block: u8,
}

impl DayPairSlot {
    /// Both days of the pair.
    pub fn days(&self) -> [u8; 2] {
        [self.first_day, self.second_day]
    }
}

const fn single(day_of_week: u8, session: SessionHalf) -> RotatingSlot {
    RotatingSlot {
        day_of_week,
        session,
    }
}

const fn pair(first_day: u8, second_day: u8, session_block: u8) -> DayPairSlot {
    DayPairSlot {
        first_day,
        second_day,
        session_block,
    }
}

/// Single-day rotation: sweep Monday–Saturday mornings/afternoons
/// forward, then revisit each day on the opposite half.
pub const ROTATING_SLOTS: [RotatingSlot; SEQUENCE_LEN] = [
    single(2, SessionHalf::Morning),
    single(3, SessionHalf::Afternoon),
    single(4, SessionHalf::Morning),
    single(5, SessionHalf::Afternoon),
    single(6, SessionHalf::Morning),
    single(7, SessionHalf::Afternoon),
    single(2, SessionHalf::Afternoon),
    single(3, SessionHalf::Morning),
    single(4, SessionHalf::Afternoon),
    single(5, SessionHalf::Morning),
    single(6, SessionHalf::Afternoon),
    single(7, SessionHalf::Morning),
];

/// Paired-day rotation: three consecutive day-pairs, cycling through
/// session blocks pair-first.
pub const DAY_PAIR_SLOTS: [DayPairSlot; SEQUENCE_LEN] = [
    pair(2, 3, 1),
    pair(2, 3, 2),
    pair(4, 5, 3),
    pair(4, 5, 4),
    pair(6, 7, 1),
    pair(6, 7, 2),
    pair(2, 3, 3),
    pair(2, 3, 4),
    pair(4, 5, 1),
    pair(4, 5, 2),
    pair(6, 7, 3),
    pair(6, 7, 4),
];

/// First single-day index after a cursor position.
///
/// Cursor -1 (uninitialized) starts the sequence at its head.
pub fn next_start_index(cursor: i32) -> usize {
    (cursor + 1).rem_euclid(SEQUENCE_LEN as i32) as usize
}

/// Maps a single-day cursor to a paired-day starting index.
///
/// Jumps to the first session-block of the day-pair group after the
/// one covering the cursor, so paired allocation starts on a fresh
/// day-pair instead of a day already used by a regular subject:
/// `((floor(cursor / 2) + 1) × 4) mod 12`. Cursor -1 maps to 0.
pub fn map_single_to_paired(cursor: i32) -> usize {
    let pair_index = cursor.div_euclid(2) + 1;
    (pair_index * 4).rem_euclid(SEQUENCE_LEN as i32) as usize
}
