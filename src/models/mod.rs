//! Timetabling domain models.
//!
//! Core data types for requests, template rows, rooms, emitted schedule
//! rows, occupancy keys, and materialized schedule entries.
//!
//! # Type Map
//!
//! | Type | Role |
//! |------|------|
//! | `SectionRequest` | One subject to schedule, with section count |
//! | `TemplateRow` | Reusable weekly recurrence pattern |
//! | `Room` | Physical room with capacity/category/status |
//! | `ScheduleRow` | Emitted (section, template) pairing |
//! | `OccupancyKey` | One room's use at one day/session-block |
//! | `ScheduleEntry` | Imported schedule line for conflict checks |

mod entry;
mod occupancy;
mod request;
mod room;
mod row;
mod template;

pub use entry::{ScheduleEntry, SlotKey, SlotOccurrence};
pub use occupancy::{OccupancyCounts, OccupancyKey};
pub use request::SectionRequest;
pub use room::{Room, RoomCategory, RoomStatus};
pub use row::ScheduleRow;
pub use template::{Cell, RawRow, TemplateRow, WEEK_COUNT};
