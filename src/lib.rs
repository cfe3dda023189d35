//! University timetabling core.
//!
//! Generates weekly class timetables in two-phase batches: a rotating
//! slot sequence spreads class sections across the week, a room engine
//! assigns rooms by capacity, category, and campus geography, and an
//! occupancy ledger stages every booking until the caller commits the
//! batch.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `TemplateRow`, `SectionRequest`,
//!   `ScheduleRow`, `Room`, `OccupancyKey`, `ScheduleEntry`
//! - **`rotation`**: The fixed rotating-slot and paired-day sequences
//! - **`catalog`**: Cached, lenient loader for the template dataset
//! - **`rooms`**: Room assignment — sticky rooms, category rules,
//!   building-preference scoring
//! - **`ledger`**: Two-layer occupancy record with commit semantics
//! - **`scheduler`**: Batch orchestration — `BatchScheduler`
//! - **`conflicts`**: Post-hoc double-booking detection
//! - **`stores`**: Persistence traits plus in-memory implementations
//! - **`config`**: Tunable constants — `ScheduleConfig`
//! - **`error`**: Crate error type — `ScheduleError`
//!
//! # Architecture
//!
//! All persistence sits behind the `stores` traits; the scheduling core
//! is pure in-memory logic, so database- or spreadsheet-backed
//! deployments only implement the traits. Generation never writes
//! through them — durability is confined to `commit_batch`,
//! `reset_all`, and `reset_cursor`.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Carter & Laporte (1997), "Recent Developments in Practical Course
//!   Timetabling"

pub mod catalog;
pub mod config;
pub mod conflicts;
pub mod error;
pub mod ledger;
pub mod models;
pub mod rooms;
pub mod rotation;
pub mod scheduler;
pub mod stores;
