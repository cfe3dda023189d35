//! Collaborator interfaces and in-memory backends.
//!
//! The core never performs I/O itself; template data, room inventory,
//! and persisted occupancy state arrive through these traits. The
//! `Memory*` implementations back tests and standalone use; production
//! callers substitute their own storage.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::error::ScheduleResult;
use crate::models::{OccupancyKey, RawRow, Room, RoomStatus};

/// Supplies raw template dataset rows.
pub trait TemplateSource: Send + Sync {
    /// Loads every raw row of the backing dataset.
    fn load_rows(&self) -> ScheduleResult<Vec<RawRow>>;
}

/// Supplies the room inventory and accepts status transitions.
pub trait RoomInventory: Send + Sync {
    /// Lists every room.
    fn list_all(&self) -> ScheduleResult<Vec<Room>>;

    /// Transitions one room's operational status. Unknown codes are
    /// ignored (the room may have been deleted since listing).
    fn set_status(&self, code: &str, status: RoomStatus) -> ScheduleResult<()>;
}

/// Persists the committed (global) occupancy set.
pub trait OccupancyStore: Send + Sync {
    /// Loads the committed set.
    fn load(&self) -> ScheduleResult<HashSet<OccupancyKey>>;

    /// Replaces the committed set.
    fn save(&self, keys: &HashSet<OccupancyKey>) -> ScheduleResult<()>;
}

/// Persists the rotation cursor.
pub trait CursorStore: Send + Sync {
    /// Loads the cursor; -1 when never written.
    fn load(&self) -> ScheduleResult<i32>;

    /// Replaces the cursor.
    fn save(&self, cursor: i32) -> ScheduleResult<()>;
}

/// Maps majors to ordered building preferences.
pub trait BuildingPreferences: Send + Sync {
    /// Preferred buildings for a major, best first. An empty list means
    /// "no preference configured"; the scheduler applies its default.
    fn preferred_for(&self, major: Option<&str>) -> Vec<String>;
}

/// Subject → room assignments made earlier in the running batch.
///
/// Scoped to one generation: cleared when a batch starts, never shared
/// across batches.
#[derive(Debug, Default)]
pub struct StickyRooms {
    by_subject: HashMap<String, String>,
}

impl StickyRooms {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Room already chosen for a subject this batch.
    pub fn get(&self, subject_code: &str) -> Option<&str> {
        self.by_subject.get(subject_code).map(String::as_str)
    }

    /// Records the room chosen for a subject.
    pub fn set(&mut self, subject_code: impl Into<String>, room_code: impl Into<String>) {
        self.by_subject.insert(subject_code.into(), room_code.into());
    }

    /// Forgets one subject's room.
    pub fn clear(&mut self, subject_code: &str) {
        self.by_subject.remove(subject_code);
    }

    /// Forgets everything; called at batch start.
    pub fn clear_all(&mut self) {
        self.by_subject.clear();
    }

    /// Number of subjects with a sticky room.
    pub fn len(&self) -> usize {
        self.by_subject.len()
    }

    /// Whether no sticky room is recorded.
    pub fn is_empty(&self) -> bool {
        self.by_subject.is_empty()
    }
}

/// In-memory template source.
#[derive(Debug, Default)]
pub struct MemoryTemplateSource {
    rows: Mutex<Vec<RawRow>>,
}

impl MemoryTemplateSource {
    /// Creates a source over the given raw rows.
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Replaces the dataset (callers should invalidate the catalog).
    pub fn replace(&self, rows: Vec<RawRow>) {
        *self.rows.lock() = rows;
    }
}

impl TemplateSource for MemoryTemplateSource {
    fn load_rows(&self) -> ScheduleResult<Vec<RawRow>> {
        Ok(self.rows.lock().clone())
    }
}

/// In-memory room inventory.
#[derive(Debug, Default)]
pub struct MemoryRoomInventory {
    rooms: Mutex<Vec<Room>>,
}

impl MemoryRoomInventory {
    /// Creates an inventory over the given rooms.
    pub fn new(rooms: Vec<Room>) -> Self {
        Self {
            rooms: Mutex::new(rooms),
        }
    }
}

impl RoomInventory for MemoryRoomInventory {
    fn list_all(&self) -> ScheduleResult<Vec<Room>> {
        Ok(self.rooms.lock().clone())
    }

    fn set_status(&self, code: &str, status: RoomStatus) -> ScheduleResult<()> {
        let mut rooms = self.rooms.lock();
        if let Some(room) = rooms.iter_mut().find(|r| r.code == code) {
            room.status = status;
        }
        Ok(())
    }
}

/// In-memory occupancy store.
#[derive(Debug, Default)]
pub struct MemoryOccupancyStore {
    keys: Mutex<HashSet<OccupancyKey>>,
}

impl MemoryOccupancyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with committed keys.
    pub fn with_keys(keys: HashSet<OccupancyKey>) -> Self {
        Self {
            keys: Mutex::new(keys),
        }
    }
}

impl OccupancyStore for MemoryOccupancyStore {
    fn load(&self) -> ScheduleResult<HashSet<OccupancyKey>> {
        Ok(self.keys.lock().clone())
    }

    fn save(&self, keys: &HashSet<OccupancyKey>) -> ScheduleResult<()> {
        *self.keys.lock() = keys.clone();
        Ok(())
    }
}

/// In-memory cursor store; loads -1 until first written.
#[derive(Debug)]
pub struct MemoryCursorStore {
    cursor: Mutex<i32>,
}

impl MemoryCursorStore {
    /// Creates a store holding the uninitialized cursor.
    pub fn new() -> Self {
        Self {
            cursor: Mutex::new(-1),
        }
    }

    /// Creates a store holding a specific cursor.
    pub fn with_cursor(cursor: i32) -> Self {
        Self {
            cursor: Mutex::new(cursor),
        }
    }
}

impl Default for MemoryCursorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> ScheduleResult<i32> {
        Ok(*self.cursor.lock())
    }

    fn save(&self, cursor: i32) -> ScheduleResult<()> {
        *self.cursor.lock() = cursor;
        Ok(())
    }
}

/// Fixed per-major building preferences.
#[derive(Debug, Default)]
pub struct StaticBuildingPreferences {
    by_major: HashMap<String, Vec<String>>,
}

impl StaticBuildingPreferences {
    /// Creates an empty provider (every major falls through to the
    /// scheduler's default list).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a major's preference order.
    pub fn with_major<I, S>(mut self, major: impl Into<String>, buildings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by_major
            .insert(major.into(), buildings.into_iter().map(Into::into).collect());
        self
    }
}

impl BuildingPreferences for StaticBuildingPreferences {
    fn preferred_for(&self, major: Option<&str>) -> Vec<String> {
        major
            .and_then(|m| self.by_major.get(m))
            .cloned()
            .unwrap_or_default()
    }
}

/// A store that always fails; exercises persistence error paths.
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl OccupancyStore for FailingStore {
    fn load(&self) -> ScheduleResult<HashSet<OccupancyKey>> {
        Err(crate::error::ScheduleError::persistence(
            "loading occupancy set",
            "backend offline",
        ))
    }

    fn save(&self, _keys: &HashSet<OccupancyKey>) -> ScheduleResult<()> {
        Err(crate::error::ScheduleError::persistence(
            "saving occupancy set",
            "backend offline",
        ))
    }
}
