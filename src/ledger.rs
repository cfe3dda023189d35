//! Occupancy ledger.
//!
//! Tracks which `(room, day, session-block)` slots are taken, in two
//! layers: a *global* layer mirroring the persisted state, and a
//! *session* layer holding marks made by the current batch. A batch is
//! generated against the union of both layers and only becomes durable
//! on [`OccupancyLedger::commit`]; until then it can be thrown away by
//! starting the next batch.
//!
//! The rotation cursor follows the same discipline: the session cursor
//! moves while a batch is generated, the committed cursor only moves
//! when the batch is committed.

use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ScheduleResult;
use crate::models::{OccupancyCounts, OccupancyKey};
use crate::stores::{CursorStore, OccupancyStore};

/// Result of committing a batch: what became durable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Keys that entered the global layer with this commit, sorted.
    pub newly_committed: Vec<OccupancyKey>,
    /// Size of the global layer after the commit.
    pub global_total: usize,
    /// Rotation cursor that was persisted.
    pub cursor: i32,
}

/// Two-layer occupancy state plus the rotation cursor.
pub struct OccupancyLedger {
    occupancy_store: Arc<dyn OccupancyStore>,
    cursor_store: Arc<dyn CursorStore>,
    global: HashSet<OccupancyKey>,
    session: HashSet<OccupancyKey>,
    committed_cursor: i32,
    session_cursor: i32,
}

impl OccupancyLedger {
    /// Loads persisted occupancy and cursor; the session layer starts
    /// empty.
    pub fn load(
        occupancy_store: Arc<dyn OccupancyStore>,
        cursor_store: Arc<dyn CursorStore>,
    ) -> ScheduleResult<Self> {
        let global = occupancy_store.load()?;
        let committed_cursor = cursor_store.load()?;
        debug!(
            "occupancy ledger loaded: {} keys, cursor {committed_cursor}",
            global.len()
        );
        Ok(Self {
            occupancy_store,
            cursor_store,
            global,
            session: HashSet::new(),
            committed_cursor,
            session_cursor: committed_cursor,
        })
    }

    /// Drops uncommitted session state; the next batch starts from the
    /// committed layer and cursor.
    pub fn start_batch(&mut self) {
        if !self.session.is_empty() {
            debug!("discarding {} uncommitted occupancy keys", self.session.len());
        }
        self.session.clear();
        self.session_cursor = self.committed_cursor;
    }

    /// Whether a slot is taken in either layer.
    pub fn is_occupied(&self, key: &OccupancyKey) -> bool {
        self.global.contains(key) || self.session.contains(key)
    }

    /// Marks a slot taken in the session layer. Returns `false` when it
    /// was already occupied (either layer); marking is idempotent.
    pub fn mark_occupied(&mut self, key: OccupancyKey) -> bool {
        if self.global.contains(&key) {
            return false;
        }
        self.session.insert(key)
    }

    /// Rotation cursor as of the last commit.
    pub fn committed_cursor(&self) -> i32 {
        self.committed_cursor
    }

    /// Rotation cursor including uncommitted movement.
    pub fn session_cursor(&self) -> i32 {
        self.session_cursor
    }

    /// Moves the session cursor. Durable only after `commit`.
    pub fn set_session_cursor(&mut self, cursor: i32) {
        self.session_cursor = cursor;
    }

    /// Makes the session layer durable.
    ///
    /// The merged key set and the session cursor are persisted before
    /// any in-memory state changes, so a failed save leaves the ledger
    /// exactly as it was. A commit with an empty session still persists
    /// the cursor.
    pub fn commit(&mut self) -> ScheduleResult<CommitOutcome> {
        let mut merged = self.global.clone();
        merged.extend(self.session.iter().cloned());
        self.occupancy_store.save(&merged)?;
        self.cursor_store.save(self.session_cursor)?;

        let mut newly_committed: Vec<OccupancyKey> = self.session.drain().collect();
        newly_committed.sort();
        self.global = merged;
        self.committed_cursor = self.session_cursor;

        info!(
            "committed {} occupancy keys ({} total), cursor {}",
            newly_committed.len(),
            self.global.len(),
            self.committed_cursor
        );
        Ok(CommitOutcome {
            newly_committed,
            global_total: self.global.len(),
            cursor: self.committed_cursor,
        })
    }

    /// Clears both layers and rewinds the cursor, persistently.
    pub fn reset(&mut self) -> ScheduleResult<()> {
        let empty = HashSet::new();
        self.occupancy_store.save(&empty)?;
        self.cursor_store.save(-1)?;

        self.global.clear();
        self.session.clear();
        self.committed_cursor = -1;
        self.session_cursor = -1;
        info!("occupancy ledger reset");
        Ok(())
    }

    /// Rewinds only the rotation cursor, persistently. Occupancy keys
    /// are untouched.
    pub fn reset_cursor(&mut self) -> ScheduleResult<()> {
        self.cursor_store.save(-1)?;
        self.committed_cursor = -1;
        self.session_cursor = -1;
        info!("rotation cursor reset");
        Ok(())
    }

    /// Key counts per layer.
    pub fn counts(&self) -> OccupancyCounts {
        OccupancyCounts {
            session: self.session.len(),
            global: self.global.len(),
            total: self.session.len() + self.global.len(),
        }
    }
}
