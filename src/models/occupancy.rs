//! Occupancy keys and counts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one room's use at one day/session-block.
///
/// No two committed or session-pending assignments may share a key,
/// except the paired-day rule, which deliberately inserts two keys (one
/// per day) for the same room and session-block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupancyKey {
    /// Room code.
    pub room: String,
    /// Day of week, 2–7.
    pub day_of_week: u8,
    /// Session block, 1–4.
    pub session_block: u8,
}

impl OccupancyKey {
    /// Creates a key.
    pub fn new(room: impl Into<String>, day_of_week: u8, session_block: u8) -> Self {
        Self {
            room: room.into(),
            day_of_week,
            session_block,
        }
    }
}

impl fmt::Display for OccupancyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.room, self.day_of_week, self.session_block)
    }
}

/// Occupancy totals reported by the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyCounts {
    /// Keys marked this batch, not yet committed.
    pub session: usize,
    /// Committed keys.
    pub global: usize,
    /// Session plus global.
    pub total: usize,
}
